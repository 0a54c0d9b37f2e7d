// Built-in reference data shipped with the wizard

use super::types::{
    Action, AdminCredential, BodyLocation, Catalog, GlobalContacts, Organization, SeverityMode,
    Situation, Staff,
};

pub const CATALOG_VERSION: u32 = 1;

/// Situations offered first in emergency mode, in display order
pub const EMERGENCY_MODE_IDS: [&str; 6] = [
    "unconscious",
    "bleeding_major",
    "fall",
    "electric",
    "pinched",
    "other",
];

/// Situations offered first in unsure mode, in display order
pub const UNSURE_MODE_IDS: [&str; 6] = ["bleeding", "dizzy", "pain", "vomit", "cant_stand", "other"];

pub fn preset_ids(mode: SeverityMode) -> &'static [&'static str] {
    match mode {
        SeverityMode::Emergency => &EMERGENCY_MODE_IDS,
        SeverityMode::Unsure => &UNSURE_MODE_IDS,
    }
}

/// Situations shown on the status picker for a mode.
///
/// Preset ids missing from the catalog are skipped; when none of them
/// resolve the whole catalog is offered instead.
pub fn situations_for_mode(catalog: &Catalog, mode: SeverityMode) -> Vec<&Situation> {
    let preset: Vec<&Situation> = preset_ids(mode)
        .iter()
        .filter_map(|id| catalog.situation(id))
        .collect();

    if preset.is_empty() {
        catalog.situations.iter().collect()
    } else {
        preset
    }
}

fn organization(id: &str, name: &str, emails: &[&str]) -> Organization {
    Organization {
        id: id.to_string(),
        name: name.to_string(),
        emails: emails.iter().map(|e| e.to_string()).collect(),
    }
}

fn staff(id: &str, organization_id: &str, name: &str, reading: &str) -> Staff {
    Staff {
        id: id.to_string(),
        organization_id: organization_id.to_string(),
        name: name.to_string(),
        reading: reading.to_string(),
    }
}

fn body_location(id: &str, label: &str) -> BodyLocation {
    BodyLocation {
        id: id.to_string(),
        label: label.to_string(),
    }
}

fn groups(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|k| k.to_string()).collect()
}

const ALL_GROUPS: [&str; 3] = ["safetyHQ", "rescueTeam", "ambulanceCenter"];
const HQ_AND_RESCUE: [&str; 2] = ["safetyHQ", "rescueTeam"];
const HQ_ONLY: [&str; 1] = ["safetyHQ"];

/// Shared shape of every default situation: the body templates only differ
/// in the quoted status line.
struct SituationSeed {
    id: &'static str,
    label: &'static str,
    icon: &'static str,
    hint: &'static str,
    requires_body_location: bool,
    default_action: Action,
    emergency_groups: &'static [&'static str],
    emergency_guidance: &'static str,
    observe_guidance: &'static str,
    emergency_status: &'static str,
    observe_status: &'static str,
}

impl SituationSeed {
    fn build(self) -> Situation {
        const FOOTER: &str = "\n所属：{company}\n発生時刻：{time}\n\n状況：{detail}";
        Situation {
            id: self.id.to_string(),
            label: self.label.to_string(),
            icon: self.icon.to_string(),
            hint: self.hint.to_string(),
            requires_body_location: self.requires_body_location,
            default_action: self.default_action,
            emergency_recipient_groups: groups(self.emergency_groups),
            observe_recipient_groups: groups(&HQ_ONLY),
            emergency_guidance_text: self.emergency_guidance.to_string(),
            observe_guidance_text: self.observe_guidance.to_string(),
            subject_template: format!("[命をツナグ] {{company}} {{person}} - {}", self.label),
            emergency_body_template: format!("{{person}}さん、{}{}", self.emergency_status, FOOTER),
            observe_body_template: format!("{{person}}さん、{}{}", self.observe_status, FOOTER),
        }
    }
}

fn default_situations() -> Vec<Situation> {
    vec![
        SituationSeed {
            id: "unconscious",
            label: "意識なし",
            icon: "🧠",
            hint: "",
            requires_body_location: false,
            default_action: Action::Emergency,
            emergency_groups: &ALL_GROUPS,
            emergency_guidance: "反応がない場合は呼吸や脈を確認し、すぐに救急車（119）を呼んでください。可能なら心肺蘇生（CPR）を開始します。",
            observe_guidance: "反応がない場合は緊急性が高い可能性があります。ためらわず緊急要請を選択してください。",
            emergency_status: "「意識なし」、緊急救護必要、担架要請",
            observe_status: "「意識なし」疑い、至急確認をお願いします",
        },
        SituationSeed {
            id: "bleeding_major",
            label: "大量出血",
            icon: "🩸",
            hint: "",
            requires_body_location: true,
            default_action: Action::Emergency,
            emergency_groups: &ALL_GROUPS,
            emergency_guidance: "出血部位を圧迫して止血し、可能なら患部を心臓より高く保ちます。迷わず救急車（119）を呼んでください。",
            observe_guidance: "出血が続く・多い場合は緊急要請が必要です。圧迫止血を継続してください。",
            emergency_status: "「大量出血（{part}）」、緊急救護必要",
            observe_status: "「出血（{part}）」、経過観察しつつ状況共有",
        },
        SituationSeed {
            id: "bleeding",
            label: "出血",
            icon: "🩸",
            hint: "",
            requires_body_location: true,
            default_action: Action::Observe,
            emergency_groups: &ALL_GROUPS,
            emergency_guidance: "出血が止まらない・量が多い・意識がぼんやりする場合は、迷わず救急要請してください。",
            observe_guidance: "出血部位を圧迫して止血し、改善しない場合は緊急要請へ切り替えてください。",
            emergency_status: "「出血（{part}）」、緊急救護必要",
            observe_status: "「出血（{part}）」、様子を見つつ状況共有",
        },
        SituationSeed {
            id: "fall",
            label: "転落",
            icon: "🧗",
            hint: "",
            requires_body_location: false,
            default_action: Action::Emergency,
            emergency_groups: &ALL_GROUPS,
            emergency_guidance: "頭部・体幹を動かさず安静にし、必要に応じて救急車（119）を呼んでください。",
            observe_guidance: "痛み・しびれ・意識変容があれば緊急要請へ切り替えてください。",
            emergency_status: "「転落」、緊急救護必要",
            observe_status: "「転落」疑い、状況共有",
        },
        SituationSeed {
            id: "electric",
            label: "感電",
            icon: "⚡",
            hint: "電気事故",
            requires_body_location: false,
            default_action: Action::Emergency,
            emergency_groups: &ALL_GROUPS,
            emergency_guidance: "安全確保（通電停止）後、意識・呼吸を確認。異常があれば救急車（119）を呼んでください。",
            observe_guidance: "軽症でも遅れて症状が出ることがあります。必ず上長・安全課へ共有してください。",
            emergency_status: "「感電」、緊急救護必要",
            observe_status: "「感電」疑い、状況共有",
        },
        SituationSeed {
            id: "pinched",
            label: "挟まれ",
            icon: "🧱",
            hint: "",
            requires_body_location: false,
            default_action: Action::Emergency,
            emergency_groups: &HQ_AND_RESCUE,
            emergency_guidance: "挟まれの場合は二次災害に注意しつつ救出。出血や意識障害があれば救急車（119）。",
            observe_guidance: "痛みや腫れが強い場合は緊急要請へ切り替えてください。",
            emergency_status: "「挟まれ」、緊急救護必要",
            observe_status: "「挟まれ」疑い、状況共有",
        },
        SituationSeed {
            id: "pain",
            label: "痛み",
            icon: "🤕",
            hint: "",
            requires_body_location: true,
            default_action: Action::Observe,
            emergency_groups: &HQ_AND_RESCUE,
            emergency_guidance: "強い痛み、変形、しびれ、出血がある場合は緊急要請を選択してください。",
            observe_guidance: "患部を安静にし、症状が改善しない/悪化する場合は緊急要請へ切り替えてください。",
            emergency_status: "「{part}に痛み」、緊急救護必要",
            observe_status: "{part}に痛み、様子を見る",
        },
        SituationSeed {
            id: "dizzy",
            label: "立ち眩み",
            icon: "💫",
            hint: "",
            requires_body_location: false,
            default_action: Action::Observe,
            emergency_groups: &HQ_ONLY,
            emergency_guidance: "意識低下、胸痛、呼吸困難などがある場合は緊急要請してください。",
            observe_guidance: "安全な場所で座らせ、無理に立たせず、改善しない場合は緊急要請へ切り替えてください。",
            emergency_status: "「立ち眩み」、緊急対応が必要",
            observe_status: "「立ち眩み」、様子を見つつ状況共有",
        },
        SituationSeed {
            id: "vomit",
            label: "嘔吐",
            icon: "🤢",
            hint: "",
            requires_body_location: false,
            default_action: Action::Observe,
            emergency_groups: &HQ_ONLY,
            emergency_guidance: "意識障害、血を吐く、激しい腹痛がある場合は緊急要請してください。",
            observe_guidance: "横向きに寝かせ、誤嚥に注意し、改善しない場合は緊急要請へ切り替えてください。",
            emergency_status: "「嘔吐」、緊急対応が必要",
            observe_status: "「嘔吐」、様子を見つつ状況共有",
        },
        SituationSeed {
            id: "cant_stand",
            label: "立てない",
            icon: "🧍",
            hint: "",
            requires_body_location: false,
            default_action: Action::Observe,
            emergency_groups: &HQ_ONLY,
            emergency_guidance: "意識がない、呼吸が苦しい、強い痛みがある場合は緊急要請してください。",
            observe_guidance: "無理に動かさず安静にし、改善しない場合は緊急要請へ切り替えてください。",
            emergency_status: "「立てない」、緊急対応が必要",
            observe_status: "「立てない」、様子を見つつ状況共有",
        },
        SituationSeed {
            id: "other",
            label: "その他",
            icon: "➕",
            hint: "",
            requires_body_location: false,
            default_action: Action::Observe,
            emergency_groups: &HQ_AND_RESCUE,
            emergency_guidance: "緊急性が疑われる場合は、迷わず緊急要請してください。",
            observe_guidance: "状況を整理して共有し、必要に応じて緊急要請へ切り替えてください。",
            emergency_status: "「その他」、緊急救護必要",
            observe_status: "「その他」、状況共有",
        },
    ]
    .into_iter()
    .map(SituationSeed::build)
    .collect()
}

/// The catalog a fresh install starts from
pub fn default_catalog() -> Catalog {
    Catalog {
        version: CATALOG_VERSION,
        admin: AdminCredential::default(),
        global_contacts: GlobalContacts {
            safety_hq: "safety@example.com".to_string(),
            rescue_team: "rescue@example.com".to_string(),
            ambulance_center: "dispatch@example.com".to_string(),
        },
        organizations: vec![
            organization("own", "自社", &["aa@example.com", "bb@example.com"]),
            organization("a", "A造船", &["cc@example.com", "dd@example.com"]),
            organization("b", "B株式会社", &["ee@example.com"]),
        ],
        staff: vec![
            staff("staff-own-sato", "own", "佐藤 一郎", "さとういちろう"),
            staff("staff-own-takahashi", "own", "高橋 花子", "たかはしはなこ"),
            staff("staff-a-yamada", "a", "山田 太郎", "やまだたろう"),
            staff("staff-a-ito", "a", "伊藤 次郎", "いとうじろう"),
            staff("staff-b-suzuki", "b", "鈴木 三郎", "すずきさぶろう"),
        ],
        situations: default_situations(),
        body_locations: vec![
            body_location("head", "頭"),
            body_location("neck", "首"),
            body_location("torso", "胸/腹"),
            body_location("leftArm", "左腕"),
            body_location("rightArm", "右腕"),
            body_location("leftHand", "左手"),
            body_location("rightHand", "右手"),
            body_location("hips", "腰"),
            body_location("leftLeg", "左脚"),
            body_location("rightLeg", "右脚"),
            body_location("leftFoot", "左足"),
            body_location("rightFoot", "右足"),
        ],
    }
}
