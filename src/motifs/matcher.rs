use super::table::{MotifRule, MotifTable};
use crate::models::MatchResult;
use crate::protein::models::SequenceRecord;

/// First rule of the list that occurs anywhere in the sequence.
pub fn first_matching_rule<'r>(rules: &'r [MotifRule], sequence: &str) -> Option<&'r MotifRule> {
    rules.iter().find(|rule| rule.is_found_in(sequence))
}

/// Checks every kinase of the table against one sequence.
///
/// A kinase is recorded as soon as one of its rules matches, the remaining
/// rules are not tried.
pub fn scan_sequence<'t>(table: &'t MotifTable, sequence: &str) -> MatchResult<'t> {
    let mut out = MatchResult::new();
    for entry in table.entries() {
        if first_matching_rule(&entry.rules, sequence).is_some() {
            out.record_hit(entry.name.as_str());
        }
    }
    out
}

pub fn scan_record<'t>(table: &'t MotifTable, record: &SequenceRecord) -> MatchResult<'t> {
    scan_sequence(table, &record.sequence)
}
