use crate::errors::{KinaseMotifError, Result};
use log::*;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const D2P2_ENDPOINT: &str = "http://d2p2.pro/api/seqid";
pub const RESULT_SUFFIX: &str = "_d2p2_result.out";

/// Consensus disorder ranges the service reports for one identifier.
///
/// Each range is kept as the list of fields the service sends back, usually
/// a start and an end position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisorderRanges {
    pub seqid: String,
    pub ranges: Vec<Vec<String>>,
}

impl DisorderRanges {
    /// Picks `response[seqid][0][2]["disorder"]["consranges"]` out of a
    /// service reply.
    pub fn from_value(seqid: &str, response: &Value) -> Result<Self> {
        let consranges = response
            .get(seqid)
            .and_then(|x| x.get(0))
            .and_then(|x| x.get(2))
            .and_then(|x| x.get("disorder"))
            .and_then(|x| x.get("consranges"))
            .and_then(Value::as_array)
            .ok_or_else(|| KinaseMotifError::NotFound(seqid.to_string()))?;

        let ranges = consranges
            .iter()
            .map(|range| match range {
                Value::Array(fields) => fields.iter().map(field_to_string).collect(),
                other => vec![field_to_string(other)],
            })
            .collect();

        Ok(Self {
            seqid: seqid.to_string(),
            ranges,
        })
    }

    pub fn from_response(seqid: &str, body: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(body)?;
        Self::from_value(seqid, &value)
    }

    /// `outdir/<seqid>_d2p2_result.out`, with path separators in the
    /// identifier replaced so the file stays inside `outdir`.
    pub fn output_path_in(&self, outdir: &Path) -> PathBuf {
        let safe_id: String = self
            .seqid
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        outdir.join(format!("{}{}", safe_id, RESULT_SUFFIX))
    }

    /// One tab separated line per range.
    pub fn write_to_dir(&self, outdir: &Path) -> Result<PathBuf> {
        let out_path = self.output_path_in(outdir);
        let mut file = std::io::BufWriter::new(
            std::fs::File::create(&out_path).map_err(|e| KinaseMotifError::io_at(&out_path, e))?,
        );
        for range in &self.ranges {
            writeln!(file, "{}", range.join("\t"))
                .map_err(|e| KinaseMotifError::io_at(&out_path, e))?;
        }
        file.flush()
            .map_err(|e| KinaseMotifError::io_at(&out_path, e))?;
        Ok(out_path)
    }
}

fn field_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Anything that can resolve an identifier to its disorder ranges.
pub trait DisorderSource {
    fn fetch(&self, seqid: &str) -> Result<DisorderRanges>;
}

pub struct D2p2Client {
    endpoint: String,
    http: Client,
}

impl D2p2Client {
    pub fn new(endpoint: &str) -> Result<Self> {
        let http = Client::builder().build()?;
        Ok(Self {
            endpoint: endpoint.to_string(),
            http,
        })
    }

    /// `seqids=["ID"]`, with the id JSON-escaped.
    pub fn request_body(seqid: &str) -> Result<String> {
        Ok(format!("seqids={}", serde_json::to_string(&[seqid])?))
    }
}

impl DisorderSource for D2p2Client {
    fn fetch(&self, seqid: &str) -> Result<DisorderRanges> {
        debug!("Requesting {} from {}", seqid, self.endpoint);
        let body = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Self::request_body(seqid)?)
            .send()?
            .error_for_status()?
            .text()?;
        DisorderRanges::from_response(seqid, &body)
    }
}

#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub written: Vec<PathBuf>,
    pub not_found: Vec<String>,
    pub failed: Vec<(String, KinaseMotifError)>,
}

/// Reads one identifier per line, skipping blank lines.
pub fn read_seqids<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| KinaseMotifError::io_at(path, e))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|x| !x.is_empty())
        .map(str::to_string)
        .collect())
}

/// Fetches every identifier in turn; unannotated identifiers and failures
/// are collected rather than stopping the run.
pub fn fetch_all<S: DisorderSource>(source: &S, seqids: &[String], outdir: &Path) -> Result<FetchOutcome> {
    if !outdir.exists() {
        std::fs::create_dir_all(outdir).map_err(|e| KinaseMotifError::io_at(outdir, e))?;
    }

    let mut outcome = FetchOutcome::default();
    for seqid in seqids {
        match source.fetch(seqid).and_then(|ranges| ranges.write_to_dir(outdir)) {
            Ok(path) => {
                info!("Written {}", path.display());
                outcome.written.push(path);
            }
            Err(e) if e.is_not_found() => {
                warn!("{}", e);
                outcome.not_found.push(seqid.clone());
            }
            Err(e) => {
                error!("Failed to fetch {}: {}", seqid, e);
                outcome.failed.push((seqid.clone(), e));
            }
        }
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const P04637_REPLY: &str = r#"{
        "P04637": [
            ["P04637", "some_db", {
                "disorder": {
                    "consranges": [["1", "93"], ["290", "323"], [356, 393]]
                }
            }]
        ]
    }"#;

    struct FakeService {
        replies: HashMap<String, String>,
    }

    impl DisorderSource for FakeService {
        fn fetch(&self, seqid: &str) -> Result<DisorderRanges> {
            match self.replies.get(seqid) {
                Some(body) => DisorderRanges::from_response(seqid, body),
                None => Err(KinaseMotifError::Configuration("offline".to_string())),
            }
        }
    }

    #[test]
    fn test_parse_reply() {
        let ranges = DisorderRanges::from_response("P04637", P04637_REPLY).unwrap();
        assert_eq!(ranges.ranges.len(), 3);
        assert_eq!(ranges.ranges[0], vec!["1", "93"]);
        assert_eq!(ranges.ranges[2], vec!["356", "393"]);
    }

    #[test]
    fn test_unannotated_is_not_found() {
        let res = DisorderRanges::from_response("Q99999", P04637_REPLY);
        assert!(matches!(res, Err(KinaseMotifError::NotFound(ref id)) if id == "Q99999"));

        let res = DisorderRanges::from_response("X", r#"{"X": []}"#);
        assert!(res.unwrap_err().is_not_found());

        let res = DisorderRanges::from_response("X", "not json");
        assert!(matches!(res, Err(KinaseMotifError::Json(_))));
    }

    #[test]
    fn test_request_body() {
        assert_eq!(
            D2p2Client::request_body("P04637").unwrap(),
            r#"seqids=["P04637"]"#
        );
        assert_eq!(
            D2p2Client::request_body(r#"odd"id\x"#).unwrap(),
            r#"seqids=["odd\"id\\x"]"#
        );
    }

    #[test]
    fn test_output_path_stays_in_dir() {
        let ranges = DisorderRanges {
            seqid: "sp/P04637".to_string(),
            ranges: vec![],
        };
        assert_eq!(
            ranges.output_path_in(Path::new("out")),
            PathBuf::from("out/sp_P04637_d2p2_result.out")
        );
    }

    #[test]
    fn test_fetch_all() {
        let dir = tempfile::tempdir().unwrap();
        let outdir = dir.path().join("nested").join("out");

        let mut replies = HashMap::new();
        replies.insert("P04637".to_string(), P04637_REPLY.to_string());
        replies.insert("Q00000".to_string(), r#"{"Q00000": [[]]}"#.to_string());
        let service = FakeService { replies };

        let seqids: Vec<String> = ["P04637", "Q00000", "OFFLINE"]
            .iter()
            .map(|x| x.to_string())
            .collect();
        let outcome = fetch_all(&service, &seqids, &outdir).unwrap();

        assert_eq!(outcome.written.len(), 1);
        assert_eq!(outcome.not_found, vec!["Q00000".to_string()]);
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].0, "OFFLINE");

        let written = std::fs::read_to_string(outdir.join("P04637_d2p2_result.out")).unwrap();
        assert_eq!(written, "1\t93\n290\t323\n356\t393\n");
    }

    #[test]
    fn test_read_seqids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ids.txt");
        std::fs::write(&path, "P04637\n\n  Q9Y6K9  \n").unwrap();
        assert_eq!(read_seqids(&path).unwrap(), vec!["P04637", "Q9Y6K9"]);
    }
}
