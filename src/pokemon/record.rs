//! Assembles OCR fields into a Pokémon record and renders Pokesol text.

use serde::Serialize;
use std::fmt;

use super::names::NameResolver;
use crate::card::STAT_KEYS;
use crate::ocr::RawFields;

/// Item line placeholder when the item is unknown.
pub const UNKNOWN_ITEM: &str = "ふめい";

/// A single stat as read from the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatValue {
    Value(u32),
    /// OCR produced no leading digits. Rendered as `?` so the gap stays visible.
    Unrecognized,
}

impl StatValue {
    /// Parses the leading digits of the OCR text, ignoring anything after them.
    pub fn parse(text: &str) -> Self {
        let digits: String = text
            .trim()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();

        match digits.parse::<u32>() {
            Ok(value) => StatValue::Value(value),
            Err(_) => StatValue::Unrecognized,
        }
    }

    /// True only for a recognized value above zero.
    pub fn is_positive(&self) -> bool {
        matches!(self, StatValue::Value(v) if *v > 0)
    }
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatValue::Value(v) => write!(f, "{}", v),
            StatValue::Unrecognized => write!(f, "?"),
        }
    }
}

/// Six stats in H, A, B, C, D, S order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatBlock {
    pub h: StatValue,
    pub a: StatValue,
    pub b: StatValue,
    pub c: StatValue,
    pub d: StatValue,
    pub s: StatValue,
}

impl StatBlock {
    pub fn from_values(values: [StatValue; 6]) -> Self {
        let [h, a, b, c, d, s] = values;
        Self { h, a, b, c, d, s }
    }

    /// Reads the block from `<stat><suffix>` fields, e.g. `H` or `H_effort`.
    pub fn from_fields(raw: &RawFields, suffix: &str) -> Self {
        Self::from_values(STAT_KEYS.map(|key| StatValue::parse(raw.get(&format!("{}{}", key, suffix)))))
    }

    pub fn values(&self) -> [StatValue; 6] {
        [self.h, self.a, self.b, self.c, self.d, self.s]
    }
}

/// Everything recovered from one card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PokemonRecord {
    pub name: String,
    pub item: Option<String>,
    pub tera_type: Option<String>,
    pub ability: Option<String>,
    pub nature: Option<String>,
    pub moves: [String; 4],
    pub actual: StatBlock,
    pub effort: StatBlock,
}

/// Picks the record name from the two name regions.
///
/// The first region's resolved name wins, then the second's; if neither is a
/// known name the raw first-region text is kept so the user can fix it by hand.
pub fn choose_name(raw: &RawFields, names: &NameResolver) -> String {
    names
        .resolve(raw.get("pokemon_name1"))
        .or_else(|| names.resolve(raw.get("pokemon_name2")))
        .unwrap_or_else(|| raw.get("pokemon_name1").to_string())
}

/// Builds the record from normalized OCR fields and the detected nature.
pub fn assemble(raw: &RawFields, nature: &str, names: &NameResolver) -> PokemonRecord {
    PokemonRecord {
        name: choose_name(raw, names),
        item: None,
        tera_type: None,
        ability: Some(raw.get("ability").to_string()),
        nature: Some(nature.to_string()),
        moves: [1, 2, 3, 4].map(|slot| raw.get(&format!("move_{}", slot)).to_string()),
        actual: StatBlock::from_fields(raw, ""),
        effort: StatBlock::from_fields(raw, "_effort"),
    }
}

/// Renders `actual` or `actual(effort)` per stat, joined with `-`.
pub fn stat_line(actual: &StatBlock, effort: &StatBlock) -> String {
    actual
        .values()
        .iter()
        .zip(effort.values().iter())
        .map(|(a, e)| {
            if e.is_positive() {
                format!("{}({})", a, e)
            } else {
                a.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// Renders the record in the six-line Pokesol text format.
pub fn to_pokesol_text(record: &PokemonRecord, names: &NameResolver) -> String {
    [
        format!(
            "{} @ {}",
            names.to_pokesol_name(&record.name),
            record.item.as_deref().unwrap_or(UNKNOWN_ITEM)
        ),
        format!("テラスタイプ: {}", record.tera_type.as_deref().unwrap_or("")),
        format!("特性: {}", record.ability.as_deref().unwrap_or("")),
        format!("性格: {}", record.nature.as_deref().unwrap_or("")),
        stat_line(&record.actual, &record.effort),
        record.moves.join(" / "),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use StatValue::{Unrecognized, Value};

    fn names() -> NameResolver {
        NameResolver::builtin().unwrap()
    }

    fn block(values: [u32; 6]) -> StatBlock {
        StatBlock::from_values(values.map(Value))
    }

    #[test]
    fn test_stat_value_parse() {
        assert_eq!(StatValue::parse("252"), Value(252));
        assert_eq!(StatValue::parse(" 4\n"), Value(4));
        assert_eq!(StatValue::parse("0"), Value(0));
        assert_eq!(StatValue::parse("12a"), Value(12));
        assert_eq!(StatValue::parse(""), Unrecognized);
        assert_eq!(StatValue::parse("ー"), Unrecognized);
        assert_eq!(StatValue::parse("99999999999"), Unrecognized);
    }

    #[test]
    fn test_stat_line_without_effort() {
        let actual = block([175, 120, 95, 80, 90, 102]);
        let effort = block([0; 6]);
        assert_eq!(stat_line(&actual, &effort), "175-120-95-80-90-102");
    }

    #[test]
    fn test_stat_line_with_effort() {
        let actual = block([175, 120, 95, 80, 90, 102]);
        let effort = block([0, 252, 0, 0, 4, 0]);
        assert_eq!(stat_line(&actual, &effort), "175-120(252)-95-80-90(4)-102");
    }

    #[test]
    fn test_stat_line_unrecognized() {
        let actual = StatBlock::from_values([Value(100), Unrecognized, Value(50), Value(0), Value(50), Value(30)]);
        // An unreadable effort is shown as no effort, an unreadable stat as "?"
        let effort = StatBlock::from_values([Unrecognized, Value(0), Value(4), Value(0), Value(0), Value(252)]);
        assert_eq!(stat_line(&actual, &effort), "100-?-50(4)-0-50-30(252)");
    }

    #[test]
    fn test_choose_name_prefers_first_region() {
        let names = names();

        let raw = RawFields::from([("pokemon_name1", "プリン"), ("pokemon_name2", "ピカチュウ")]);
        assert_eq!(choose_name(&raw, &names), "プリン");

        // Dual-type layout: first region picks up the type icon and fails
        let raw = RawFields::from([("pokemon_name1", "@ ぞプリン"), ("pokemon_name2", "プリン")]);
        assert_eq!(choose_name(&raw, &names), "プリン");

        // Neither resolves: keep raw text of the first region
        let raw = RawFields::from([("pokemon_name1", "ブリソ"), ("pokemon_name2", "")]);
        assert_eq!(choose_name(&raw, &names), "ブリソ");
    }

    #[test]
    fn test_assemble_and_render() {
        let names = names();
        let raw = RawFields::from([
            ("pokemon_name1", "バドレックス(はくばじょう)"),
            ("ability", "じんばいったい"),
            ("move_1", "ブリザードランス"),
            ("move_2", "まもる"),
            ("move_3", "トリックルーム"),
            ("move_4", "ヘビーボンバー"),
            ("H", "207"),
            ("A", "217"),
            ("B", "170"),
            ("C", "94"),
            ("D", "150"),
            ("S", "63"),
            ("H_effort", "252"),
            ("A_effort", "252"),
            ("B_effort", "0"),
            ("C_effort", "0"),
            ("D_effort", "4"),
            ("S_effort", "0"),
        ]);

        let record = assemble(&raw, "ゆうかん", &names);
        assert_eq!(record.name, "バドレックス(はくばじょう)");
        assert_eq!(record.item, None);

        let text = to_pokesol_text(&record, &names);
        assert_eq!(
            text,
            "バドレックス(白馬) @ ふめい\n\
             テラスタイプ: \n\
             特性: じんばいったい\n\
             性格: ゆうかん\n\
             207(252)-217(252)-170-94-150(4)-63\n\
             ブリザードランス / まもる / トリックルーム / ヘビーボンバー"
        );
    }

    #[test]
    fn test_render_missing_fields() {
        let names = names();
        let record = assemble(&RawFields::default(), "まじめ", &names);

        let text = to_pokesol_text(&record, &names);
        let lines: Vec<&str> = text.split('\n').collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], " @ ふめい");
        assert_eq!(lines[2], "特性: ");
        assert_eq!(lines[4], "?-?-?-?-?-?");
        assert_eq!(lines[5], " /  /  / ");
    }

    #[test]
    fn test_render_optional_fields() {
        let names = names();
        let mut record = assemble(&RawFields::from([("pokemon_name1", "プリン")]), "まじめ", &names);
        record.item = Some("たべのこし".to_string());
        record.tera_type = Some("フェアリー".to_string());
        record.ability = None;
        record.nature = None;

        let text = to_pokesol_text(&record, &names);
        assert!(text.starts_with("プリン @ たべのこし\nテラスタイプ: フェアリー\n特性: \n性格: \n"));
    }

    #[test]
    fn test_record_serializes() {
        let names = names();
        let record = assemble(&RawFields::from([("pokemon_name1", "プリン"), ("H", "100")]), "のんき", &names);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["name"], "プリン");
        assert_eq!(json["actual"]["h"]["value"], 100);
        assert_eq!(json["actual"]["a"], "unrecognized");
        assert!(json["item"].is_null());
    }
}
