//! Prayer texts and guided prayer step generation.
//!
//! The wording here is fixed devotional content. Closing prayers are
//! deliberately asymmetric: Joyful days never mention the intention,
//! Sorrowful and Glorious days do, and Glorious petition days end with a
//! full Hail Mary.

use crate::calendar::NovenaDay;
use crate::{ChapletType, Mystery, Phase, PrayerStep, PrayerType};

pub const HAIL_MARY: &str = "Hail Mary, full of grace, the Lord is with thee. \
Blessed art thou amongst women, and blessed is the fruit of thy womb, Jesus. \
Holy Mary, Mother of God, pray for us sinners, now and at the hour of our death. Amen.";

pub const DEFAULT_INTENTION: &str = "your request";

const OUR_FATHER: &str = "Our Father, who art in heaven, hallowed be thy name; \
thy kingdom come, thy will be done on earth as it is in heaven. \
Give us this day our daily bread, and forgive us our trespasses, \
as we forgive those who trespass against us; \
and lead us not into temptation, but deliver us from evil. Amen.";

const GLORY_BE: &str = "Glory be to the Father, and to the Son, and to the Holy Spirit. \
As it was in the beginning, is now, and ever shall be, world without end. Amen.";

const APOSTLES_CREED: &str = "I believe in God, the Father almighty, Creator of heaven and earth, \
and in Jesus Christ, his only Son, our Lord, who was conceived by the Holy Spirit, \
born of the Virgin Mary, suffered under Pontius Pilate, was crucified, died and was buried; \
he descended into hell; on the third day he rose again from the dead; \
he ascended into heaven, and is seated at the right hand of God the Father almighty; \
from there he will come to judge the living and the dead. \
I believe in the Holy Spirit, the holy catholic Church, the communion of saints, \
the forgiveness of sins, the resurrection of the body, and life everlasting. Amen.";

const SIGN_OF_THE_CROSS: &str =
    "In the name of the Father, and of the Son, and of the Holy Spirit. Amen.";

const FATIMA_PRAYER: &str = "O my Jesus, forgive us our sins, save us from the fires of hell; \
lead all souls to heaven, especially those in most need of thy mercy.";

const HAIL_HOLY_QUEEN: &str = "Hail, Holy Queen, Mother of Mercy, our life, our sweetness and our hope. \
To thee do we cry, poor banished children of Eve; to thee do we send up our sighs, \
mourning and weeping in this valley of tears. Turn then, most gracious advocate, \
thine eyes of mercy toward us, and after this our exile show unto us \
the blessed fruit of thy womb, Jesus. O clement, O loving, O sweet Virgin Mary. \
Pray for us, O holy Mother of God, that we may be made worthy of the promises of Christ.";

const ROSARY_FINAL_PRAYER: &str = "O God, whose only begotten Son, by his life, death and resurrection, \
has purchased for us the rewards of eternal life; grant, we beseech thee, that meditating upon \
these mysteries of the Most Holy Rosary of the Blessed Virgin Mary, we may imitate what they \
contain and obtain what they promise, through the same Christ our Lord. Amen.";

const ETERNAL_FATHER: &str = "Eternal Father, I offer you the Body and Blood, Soul and Divinity \
of your dearly beloved Son, our Lord Jesus Christ, in atonement for our sins and those of the whole world.";

const FOR_THE_SAKE: &str =
    "For the sake of his sorrowful Passion, have mercy on us and on the whole world.";

const HOLY_GOD: &str = "Holy God, Holy Mighty One, Holy Immortal One, \
have mercy on us and on the whole world.";

const NOVENA_CONCLUSION: &str = "Mary, Queen of the Most Holy Rosary, pray for us. \
May the divine assistance remain always with us. Amen.";

// ============================================================================
// Novena opening and closing prayers
// ============================================================================

const OPENING_PREAMBLE_PETITION: &str = "Hail, Queen of the Most Holy Rosary, my Mother Mary, hail! \
At thy feet I humbly kneel to offer thee a Crown of Roses, ";

const OPENING_PREAMBLE_THANKSGIVING: &str = "Hail, Queen of the Most Holy Rosary, my Mother Mary, hail! \
At thy feet I gratefully kneel to offer thee a Crown of Roses, ";

const OPENING_CLOSE_PETITION: &str = "each ten bound together with my petition for a particular grace. \
O Holy Queen, dispenser of God's graces, and Mother of all who invoke thee! \
Thou canst not look upon my gift and fail to see its binding. \
As thou receivest my gift, so wilt thou receive my petition; \
from thy bounty thou wilt give me the favor I so earnestly and trustingly seek. \
I despair of nothing that I ask of thee. Show thyself my Mother!";

const OPENING_CLOSE_THANKSGIVING: &str = "each ten bound together with my heartfelt thanks for the favor thou hast obtained for me. \
O Holy Queen, dispenser of God's graces, and Mother of all who invoke thee! \
Thou hast looked upon my gift and seen its binding; \
thou hast received my petition and from thy bounty hast given me the favor I so earnestly sought. \
Accept this crown in thanksgiving. Show thyself ever my Mother!";

const CLOSING_BASE: &str = "Sweet Mother Mary, I offer thee this spiritual communion \
to bind my bouquet in a wreath to place upon thy brow.";

fn mystery_clause(mystery: Mystery) -> &'static str {
    match mystery {
        Mystery::Joyful => {
            "snow-white buds to remind thee of thy joys, each bud recalling to thee a holy mystery, "
        }
        Mystery::Sorrowful => {
            "blood-red roses to remind thee of the passion of thy divine Son, \
with whom thou didst so completely share each bitter moment, each rose recalling to thee a holy mystery, "
        }
        Mystery::Glorious => {
            "full-blown white and red roses, tinged with the gold of glory, \
to remind thee of the glories of thy Son and of thyself, each rose recalling to thee a holy mystery, "
        }
        Mystery::Luminous => {
            "radiant roses to remind thee of the light of thy Son's public life, \
each rose recalling to thee a holy mystery, "
        }
    }
}

/// Novena opening prayer for a mystery and phase
pub fn opening_prayer(mystery: Mystery, phase: Phase) -> String {
    let (preamble, close) = match phase {
        Phase::Petition => (OPENING_PREAMBLE_PETITION, OPENING_CLOSE_PETITION),
        Phase::Thanksgiving => (OPENING_PREAMBLE_THANKSGIVING, OPENING_CLOSE_THANKSGIVING),
    };
    format!("{}{}{}", preamble, mystery_clause(mystery), close)
}

fn petition_closing(favor: &str) -> String {
    format!(
        "{} O my Mother! Look favorably upon my gift, and in thy love obtain for me {}.",
        CLOSING_BASE, favor
    )
}

fn thanksgiving_closing(favor: &str) -> String {
    format!(
        "{} I offer it in thanksgiving for {} which thou in thy love hast obtained for me.",
        CLOSING_BASE, favor
    )
}

/// Novena closing prayer
///
/// Joyful days and calls without a mystery use the fixed wording and never
/// include `intention`. Sorrowful and Glorious days interpolate it (default
/// "your request"); Glorious petition days append a Hail Mary.
pub fn closing_prayer(phase: Phase, mystery: Option<Mystery>, intention: Option<&str>) -> String {
    let intention = intention
        .map(str::trim)
        .filter(|i| !i.is_empty())
        .unwrap_or(DEFAULT_INTENTION);

    match (mystery, phase) {
        (Some(Mystery::Sorrowful), Phase::Petition) => petition_closing(intention),
        (Some(Mystery::Sorrowful), Phase::Thanksgiving) => thanksgiving_closing(intention),
        (Some(Mystery::Glorious), Phase::Petition) => {
            format!("{}\n\n{}", petition_closing(intention), HAIL_MARY)
        }
        (Some(Mystery::Glorious), Phase::Thanksgiving) => thanksgiving_closing(intention),
        (_, Phase::Petition) => petition_closing("the favor I so earnestly seek"),
        (_, Phase::Thanksgiving) => thanksgiving_closing("the favor"),
    }
}

// ============================================================================
// Decade tables
// ============================================================================

const JOYFUL_DECADES: [&str; 5] = [
    "The Annunciation: O Mary, obtain for me the virtue of humility.",
    "The Visitation: O Mary, obtain for me a great love of my neighbor.",
    "The Nativity: O Mary, obtain for me a spirit of poverty and detachment from the world.",
    "The Presentation: O Mary, obtain for me the virtue of obedience.",
    "The Finding in the Temple: O Mary, obtain for me the grace to seek Jesus always.",
];

const SORROWFUL_DECADES: [&str; 5] = [
    "The Agony in the Garden: O Mary, obtain for me true sorrow for my sins.",
    "The Scourging at the Pillar: O Mary, obtain for me the virtue of purity.",
    "The Crowning with Thorns: O Mary, obtain for me moral courage.",
    "The Carrying of the Cross: O Mary, obtain for me the virtue of patience.",
    "The Crucifixion: O Mary, obtain for me the grace of final perseverance.",
];

const GLORIOUS_DECADES: [&str; 5] = [
    "The Resurrection: O Mary, obtain for me a lively faith.",
    "The Ascension: O Mary, obtain for me a firm hope.",
    "The Descent of the Holy Spirit: O Mary, obtain for me an ardent love of God.",
    "The Assumption: O Mary, obtain for me the grace of a happy death.",
    "The Coronation: O Mary, obtain for me trust in thy intercession.",
];

const LUMINOUS_DECADES: [&str; 5] = [
    "The Baptism in the Jordan: O Mary, obtain for me openness to the Holy Spirit.",
    "The Wedding at Cana: O Mary, obtain for me the grace to go to Jesus through thee.",
    "The Proclamation of the Kingdom: O Mary, obtain for me a spirit of repentance.",
    "The Transfiguration: O Mary, obtain for me a desire for holiness.",
    "The Institution of the Eucharist: O Mary, obtain for me a spirit of adoration.",
];

/// Virtue petitions said after each decade of a novena rosary
pub fn decade_prayers(mystery: Mystery) -> &'static [&'static str] {
    match mystery {
        Mystery::Joyful => &JOYFUL_DECADES,
        Mystery::Sorrowful => &SORROWFUL_DECADES,
        Mystery::Glorious => &GLORIOUS_DECADES,
        Mystery::Luminous => &LUMINOUS_DECADES,
    }
}

/// Decade petitions looked up by mystery name; unknown names yield nothing
pub fn decade_prayers_by_name(name: &str) -> &'static [&'static str] {
    name.parse::<Mystery>()
        .map(decade_prayers)
        .unwrap_or(&[])
}

fn decade_title(petition: &str) -> &str {
    petition.split(':').next().unwrap_or(petition)
}

/// Text of a named prayer used in the bead tables; unknown names yield ""
pub fn prayer_text(id: &str) -> &'static str {
    match id {
        "sign_of_the_cross" => SIGN_OF_THE_CROSS,
        "apostles_creed" => APOSTLES_CREED,
        "our_father" => OUR_FATHER,
        "hail_mary" => HAIL_MARY,
        "glory_be" => GLORY_BE,
        "fatima_prayer" => FATIMA_PRAYER,
        "hail_holy_queen" => HAIL_HOLY_QUEEN,
        "rosary_final_prayer" => ROSARY_FINAL_PRAYER,
        "eternal_father" => ETERNAL_FATHER,
        "for_the_sake" => FOR_THE_SAKE,
        "holy_god" => HOLY_GOD,
        _ => "",
    }
}

// ============================================================================
// Guided steps
// ============================================================================

/// Inputs that vary the text of a guided prayer
#[derive(Clone, Copy, Debug)]
pub struct StepContext<'a> {
    pub mystery: Mystery,
    pub phase: Phase,
    pub intention: Option<&'a str>,
}

impl<'a> StepContext<'a> {
    /// Context for a novena day
    pub fn for_day(day: NovenaDay, intention: Option<&'a str>) -> Self {
        let info = day.cycle_info();
        Self {
            mystery: info.mystery,
            phase: info.phase,
            intention,
        }
    }
}

fn step(id: impl Into<String>, title: impl Into<String>, text: impl Into<String>) -> PrayerStep {
    PrayerStep {
        id: id.into(),
        title: title.into(),
        text: text.into(),
    }
}

/// Ordered guided steps for a prayer type
///
/// Step indices line up with [`crate::mapping::step_mapping`].
pub fn prayer_steps(prayer_type: PrayerType, ctx: &StepContext<'_>) -> Vec<PrayerStep> {
    match prayer_type {
        PrayerType::DailyRosary => rosary_steps(ctx, false),
        PrayerType::FiftyFourDayNovena => rosary_steps(ctx, true),
        PrayerType::Chaplet(ChapletType::DivineMercy) => divine_mercy_steps(),
        PrayerType::Chaplet(chaplet) => generic_chaplet_steps(chaplet),
    }
}

fn rosary_steps(ctx: &StepContext<'_>, is_novena: bool) -> Vec<PrayerStep> {
    let mut steps = vec![step(
        "intro",
        "Sign of the Cross and Creed",
        format!("{}\n\n{}", SIGN_OF_THE_CROSS, APOSTLES_CREED),
    )];

    if is_novena {
        steps.push(step(
            "novena-opening",
            "Novena Opening Prayer",
            opening_prayer(ctx.mystery, ctx.phase),
        ));
    }

    steps.push(step(
        "rosary-opening",
        "Our Father, three Hail Marys, Glory Be",
        format!("{}\n\n{} (x3)\n\n{}", OUR_FATHER, HAIL_MARY, GLORY_BE),
    ));
    steps.push(step(
        "mysteries-intro",
        format!("The {} Mysteries", ctx.mystery),
        format!(
            "Today we meditate on the {} Mysteries of the Holy Rosary.",
            ctx.mystery
        ),
    ));

    for (index, petition) in decade_prayers(ctx.mystery).iter().enumerate() {
        let mut text = format!(
            "{}\n\n{} (x10)\n\n{}\n\n{}",
            OUR_FATHER, HAIL_MARY, GLORY_BE, FATIMA_PRAYER
        );
        if is_novena {
            text.push_str("\n\n");
            text.push_str(petition);
        }
        steps.push(step(
            format!("decade-{}", index + 1),
            format!("Decade {}: {}", index + 1, decade_title(petition)),
            text,
        ));
    }

    steps.push(step("hail-holy-queen", "Hail, Holy Queen", HAIL_HOLY_QUEEN));
    steps.push(step("final-prayer", "Concluding Prayer", ROSARY_FINAL_PRAYER));

    if is_novena {
        steps.push(step(
            "novena-closing",
            "Novena Closing Prayer",
            closing_prayer(ctx.phase, Some(ctx.mystery), ctx.intention),
        ));
        steps.push(step("conclusion", "Conclusion", NOVENA_CONCLUSION));
    }

    steps
}

fn divine_mercy_steps() -> Vec<PrayerStep> {
    let mut steps = vec![
        step("intro", "Sign of the Cross", SIGN_OF_THE_CROSS),
        step(
            "opening",
            "Our Father, Hail Mary, Creed",
            format!("{}\n\n{}\n\n{}", OUR_FATHER, HAIL_MARY, APOSTLES_CREED),
        ),
    ];

    for decade in 1..=5 {
        steps.push(step(
            format!("decade-{}", decade),
            format!("Decade {}", decade),
            format!("{}\n\n{} (x10)", ETERNAL_FATHER, FOR_THE_SAKE),
        ));
    }

    steps.push(step("closing", "Holy God (x3)", HOLY_GOD));
    steps
}

fn generic_chaplet_steps(chaplet: ChapletType) -> Vec<PrayerStep> {
    let prayer_type = PrayerType::Chaplet(chaplet);
    let config = crate::beads::rosary_config(prayer_type);

    crate::mapping::step_mapping(prayer_type)
        .iter()
        .map(|entry| {
            let text = config
                .bead_sequence
                .get(entry.bead_index)
                .map(|bead| {
                    bead.prayers
                        .iter()
                        .map(|p| prayer_text(p))
                        .filter(|t| !t.is_empty())
                        .collect::<Vec<_>>()
                        .join("\n\n")
                })
                .unwrap_or_default();
            step(
                entry.step_id.clone(),
                format!("{}: part {}", chaplet.name(), entry.step_index + 1),
                text,
            )
        })
        .collect()
}

/// Guided steps for one day of the 54-day novena
pub fn novena_day_steps(day: NovenaDay, intention: Option<&str>) -> Vec<PrayerStep> {
    prayer_steps(
        PrayerType::FiftyFourDayNovena,
        &StepContext::for_day(day, intention),
    )
}
