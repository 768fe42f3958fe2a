use crate::errors::{KinaseMotifError, Result};
use log::*;
use regex::Regex;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::path::Path;

/// Kinase substrate motifs as collected at the PHOSIDA database.
///
/// Each rule is a pattern over the one-letter amino acid alphabet and the
/// offset of the phosphorylated residue relative to the match start.
pub const PHOSIDA_MOTIFS: &[(&str, &[(&str, i32)])] = &[
    ("PKA", &[("R.[ST]", 2), ("R[RK].[ST]", -1), ("KR..[ST]", -1)]),
    ("CK1", &[("S..[ST]", -1), ("[ST]...S", -1)]),
    ("CK2", &[("[ST]..E", 0)]),
    ("GSK3", &[("S...S", 0)]),
    ("CDK2", &[("[ST]P.[KR]", 0)]),
    ("CAMK2", &[("R..[ST]", -1), ("R..[ST]V", -2)]),
    ("ERK/MAPK", &[("P.[ST]P", 3), ("V.[ST]P", 3), ("PE[ST]P", 3)]),
    ("PKB/AKT", &[("R[RST].[ST].[ST]", -3), ("R.R..[ST]", -1)]),
    ("PKC", &[("R..[ST].R", -3)]),
    ("PKD", &[("[LVI].[RK]..[ST]", -1)]),
    ("LCK", &[("[IEV]Y[EG][EDPN][IVL]", 1)]),
    ("ABL", &[("[IVL]Y..[PF]", 1)]),
    ("SRC", &[("[ED]..Y..[DEAGST]", 4)]),
    ("ALK", &[("Y..[ILVM]", 0)]),
    ("EGFR", &[("[DPSAEN].Y[VLDEINP]", 2)]),
    ("CDK1", &[("[ST]P.[KR]", 0), ("[ST]P[KR]", 0)]),
    ("AURORA", &[("[RK].[ST][ILV]", 2)]),
    ("AURORA-A", &[("[RKN]R.[ST][MLVI]", 3)]),
    ("PLK", &[("[DE].[ST][VILM].[DE]", 2)]),
    ("PLK1", &[("[ED].[ST][FLIYWVM]", 2)]),
    ("NEK6", &[("L..[ST]", -1)]),
    ("CHK1/2", &[("L.R..[ST]", -1)]),
    ("CHK1", &[("[MILV].[RK]..[ST]", -1)]),
    ("PDK1", &[("F..F[ST][FY]", -2)]),
    ("NEK1", &[("[FLM][RK][RK][ST]", -1)]),
];

#[derive(Debug, Clone)]
pub struct MotifRule {
    pub pattern: String,
    /// Position of the modified residue relative to the match start.
    /// Carried along but never used to filter matches.
    pub anchor_offset: i32,
    regex: Regex,
}

impl MotifRule {
    pub fn new(pattern: &str, anchor_offset: i32) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| {
            KinaseMotifError::Configuration(format!("invalid motif pattern {:?}: {}", pattern, e))
        })?;
        Ok(Self {
            pattern: pattern.to_string(),
            anchor_offset,
            regex,
        })
    }

    /// Unanchored search anywhere in the sequence.
    pub fn is_found_in(&self, sequence: &str) -> bool {
        self.regex.is_match(sequence)
    }
}

#[derive(Debug, Clone)]
pub struct KinaseEntry {
    pub name: String,
    pub rules: Vec<MotifRule>,
}

/// Immutable kinase name -> motif rules catalog, compiled once.
///
/// Kinases are kept sorted by name, which is the column order of every table
/// and chart built from it.
#[derive(Debug, Clone)]
pub struct MotifTable {
    entries: BTreeMap<String, KinaseEntry>,
}

impl MotifTable {
    pub fn phosida() -> Result<Self> {
        Self::from_definitions(
            PHOSIDA_MOTIFS
                .iter()
                .map(|(name, rules)| (name.to_string(), rules.to_vec())),
        )
    }

    pub fn from_definitions<I, S, P>(definitions: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<(P, i32)>)>,
        S: Into<String>,
        P: AsRef<str>,
    {
        let mut entries = BTreeMap::new();
        for (name, rule_defs) in definitions {
            let name: String = name.into();
            if name.is_empty() {
                return Err(KinaseMotifError::Configuration(
                    "kinase name must not be empty".to_string(),
                ));
            }
            if rule_defs.is_empty() {
                return Err(KinaseMotifError::Configuration(format!(
                    "kinase {} has no motif rules",
                    name
                )));
            }
            if entries.contains_key(&name) {
                return Err(KinaseMotifError::Configuration(format!(
                    "kinase {} is defined more than once",
                    name
                )));
            }

            let rules = rule_defs
                .iter()
                .map(|(pattern, offset)| MotifRule::new(pattern.as_ref(), *offset))
                .collect::<Result<Vec<_>>>()?;
            entries.insert(name.clone(), KinaseEntry { name, rules });
        }

        if entries.is_empty() {
            return Err(KinaseMotifError::Configuration(
                "motif table has no kinases".to_string(),
            ));
        }
        debug!("Compiled motif table with {} kinases", entries.len());
        Ok(Self { entries })
    }

    /// Reads a table shaped as `{"KINASE": [["PATTERN", offset], ...]}`.
    pub fn from_json(json: &str) -> Result<Self> {
        let defs: MotifDefinitions = serde_json::from_str(json).map_err(|e| {
            KinaseMotifError::Configuration(format!("malformed motif table: {}", e))
        })?;
        Self::from_definitions(defs.0)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            KinaseMotifError::Configuration(format!(
                "cannot read motif table {}: {}",
                path.display(),
                e
            ))
        })?;
        info!("Loading motif table from {}", path.display());
        Self::from_json(&json)
    }

    pub fn rules_for(&self, kinase: &str) -> Option<&[MotifRule]> {
        self.entries.get(kinase).map(|x| x.rules.as_slice())
    }

    /// Kinase names in lexicographic order.
    pub fn all_kinase_names(&self) -> Vec<&str> {
        self.entries.keys().map(|x| x.as_str()).collect()
    }

    /// Entries in lexicographic kinase order.
    pub fn entries(&self) -> impl Iterator<Item = &KinaseEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// JSON object entries in document order. Repeated kinase keys are kept so
/// `from_definitions` can reject them.
#[derive(Debug)]
struct MotifDefinitions(Vec<(String, Vec<(String, i32)>)>);

impl<'de> Deserialize<'de> for MotifDefinitions {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DefinitionsVisitor;

        impl<'de> Visitor<'de> for DefinitionsVisitor {
            type Value = MotifDefinitions;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("an object mapping kinase names to [pattern, offset] rules")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut out = Vec::new();
                while let Some(entry) = map.next_entry::<String, Vec<(String, i32)>>()? {
                    out.push(entry);
                }
                Ok(MotifDefinitions(out))
            }
        }

        deserializer.deserialize_map(DefinitionsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phosida_table_compiles() {
        let table = MotifTable::phosida().unwrap();
        assert_eq!(table.len(), PHOSIDA_MOTIFS.len());

        let pka = table.rules_for("PKA").unwrap();
        assert_eq!(pka.len(), 3);
        assert_eq!(pka[0].pattern, "R.[ST]");
        assert_eq!(pka[0].anchor_offset, 2);
        assert_eq!(pka[2].pattern, "KR..[ST]");
        assert!(table.rules_for("NOT_A_KINASE").is_none());
    }

    #[test]
    fn test_kinase_names_are_sorted() {
        let table = MotifTable::phosida().unwrap();
        let names = table.all_kinase_names();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(names[0], "ABL");
        assert_eq!(names.last(), Some(&"SRC"));
        // Byte order puts the hyphenated name after its prefix.
        let aurora = names.iter().position(|x| *x == "AURORA").unwrap();
        assert_eq!(names[aurora + 1], "AURORA-A");
    }

    #[test]
    fn test_bad_pattern_is_configuration_error() {
        let res = MotifTable::from_definitions(vec![("BROKEN", vec![("R.[ST", 0)])]);
        assert!(matches!(res, Err(KinaseMotifError::Configuration(_))));
    }

    #[test]
    fn test_rejects_empty_and_duplicate_entries() {
        let empty_rules: Vec<(&str, i32)> = vec![];
        assert!(MotifTable::from_definitions(vec![("PKA", empty_rules)]).is_err());

        let dup = MotifTable::from_definitions(vec![
            ("PKA", vec![("R.[ST]", 2)]),
            ("PKA", vec![("KR..[ST]", -1)]),
        ]);
        assert!(dup.is_err());

        let none: Vec<(&str, Vec<(&str, i32)>)> = vec![];
        assert!(MotifTable::from_definitions(none).is_err());
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "PKA": [["R.[ST]", 2], ["KR..[ST]", -1]],
            "CK2": [["[ST]..E", 0]]
        }"#;
        let table = MotifTable::from_json(json).unwrap();
        assert_eq!(table.all_kinase_names(), vec!["CK2", "PKA"]);
        assert_eq!(table.rules_for("PKA").unwrap()[1].anchor_offset, -1);

        assert!(MotifTable::from_json(r#"{"PKA": "R.[ST]"}"#).is_err());

        let dup =
            MotifTable::from_json(r#"{"PKA": [["R.[ST]", 2]], "PKA": [["KR..[ST]", -1]]}"#);
        assert!(
            matches!(dup, Err(KinaseMotifError::Configuration(ref msg)) if msg.contains("PKA"))
        );
        assert!(MotifTable::from_json(r#"{"PKA": [["R.[ST", 2]]}"#).is_err());
    }
}
