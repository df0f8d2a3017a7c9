//! httpx result parsing
//!
//! httpx writes one JSON object per probed host. Records are read
//! leniently: a line that does not parse is logged and skipped so one
//! corrupt entry does not lose the rest of a scan.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

use orion_core::Asset;

use crate::ReconError;

/// ASN block attached by `httpx -asn`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HttpxAsn {
    pub as_number: Option<String>,
    pub as_name: Option<String>,
    pub as_country: Option<String>,
}

/// One httpx JSON line
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HttpxRecord {
    pub input: Option<String>,
    pub url: Option<String>,
    pub host: Option<String>,
    pub status_code: Option<u16>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tech: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub header: serde_json::Map<String, Value>,
    pub webserver: Option<String>,
    pub asn: Option<HttpxAsn>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cdn: bool,
    pub cdn_name: Option<String>,
    pub cdn_type: Option<String>,
}

/// httpx writes `null` for some empty fields
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl HttpxRecord {
    /// Probed name: `input` when present, else the full `url`
    pub fn domain(&self) -> Option<&str> {
        self.input
            .as_deref()
            .or(self.url.as_deref())
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }

    /// Technologies as trimmed strings, empties dropped
    pub fn technologies(&self) -> Vec<String> {
        self.tech
            .iter()
            .filter(|v| !v.is_null())
            .map(|v| value_to_string(v).trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    }

    /// Response headers with lowercase names and stringified values
    pub fn headers(&self) -> BTreeMap<String, String> {
        self.header
            .iter()
            .map(|(name, value)| (name.to_lowercase(), value_to_string(value)))
            .collect()
    }

    /// Header by name, accepting httpx's underscore spelling
    pub fn header_value(&self, name: &str) -> Option<String> {
        let underscored = name.replace('-', "_");
        self.header
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name) || key.eq_ignore_ascii_case(&underscored))
            .map(|(_, value)| value_to_string(value))
            .filter(|value| !value.trim().is_empty())
    }

    /// Server banner from the webserver field or the Server header
    pub fn server(&self) -> Option<String> {
        self.webserver
            .clone()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.header_value("server"))
    }

    pub fn to_asset(&self) -> Option<Asset> {
        let domain = self.domain()?;
        let mut asset = Asset::new(domain).with_technologies(self.technologies());
        asset.ip = self.host.clone().filter(|h| !h.is_empty());
        asset.status_code = self.status_code;
        asset.headers = self.headers();
        Some(asset)
    }
}

/// Parse JSON lines, skipping blank and malformed ones
pub fn parse_records(content: &str) -> Vec<HttpxRecord> {
    let mut records = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<HttpxRecord>(line) {
            Ok(record) => records.push(record),
            Err(e) => warn!("Skipping httpx line {}: {}", index + 1, e),
        }
    }

    debug!("Parsed {} httpx records", records.len());
    records
}

/// Read and parse an httpx output file
pub async fn parse_file(path: &Path) -> Result<Vec<HttpxRecord>, ReconError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|error| ReconError::Read {
            path: path.display().to_string(),
            error,
        })?;
    Ok(parse_records(&content))
}

/// Assets for every record with a usable domain
pub fn to_assets(records: &[HttpxRecord]) -> Vec<Asset> {
    records.iter().filter_map(HttpxRecord::to_asset).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const JENKINS_LINE: &str = r#"{"input":"jenkins.example.com","url":"https://jenkins.example.com","host":"203.0.113.10","status_code":403,"tech":["Jenkins","Java",""],"header":{"server":"Jetty(9.4)","x_powered_by":"Servlet"},"webserver":"Jetty(9.4)","asn":{"as_number":"AS16509","as_name":"AMAZON-02","as_country":"US"},"cdn":false}"#;

    #[test]
    fn test_record_maps_to_asset() {
        let records = parse_records(JENKINS_LINE);
        let asset = records[0].to_asset().unwrap();

        assert_eq!(asset.domain, "jenkins.example.com");
        assert_eq!(asset.ip.as_deref(), Some("203.0.113.10"));
        assert_eq!(asset.status_code, Some(403));
        assert_eq!(asset.technologies, vec!["Jenkins", "Java"]);
        assert_eq!(asset.header("Server"), Some("Jetty(9.4)"));
    }

    #[test]
    fn test_url_is_used_without_input() {
        let records = parse_records(r#"{"url":"https://api.example.com:8443","status_code":200}"#);
        assert_eq!(records[0].domain(), Some("https://api.example.com:8443"));
    }

    #[test]
    fn test_non_string_values_are_coerced() {
        let records = parse_records(r#"{"input":"a.example.com","tech":[42,null," nginx "],"header":{"content_length":512}}"#);
        let record = &records[0];

        assert_eq!(record.technologies(), vec!["42", "nginx"]);
        assert_eq!(record.headers()["content_length"], "512");
    }

    #[test]
    fn test_header_lookup_accepts_both_spellings() {
        let records = parse_records(JENKINS_LINE);
        let record = &records[0];

        assert_eq!(record.header_value("X-Powered-By").as_deref(), Some("Servlet"));
        assert_eq!(record.server().as_deref(), Some("Jetty(9.4)"));
        assert_eq!(record.header_value("x-frame-options"), None);
    }

    #[test]
    fn test_null_collections_keep_the_record() {
        let records = parse_records(
            r#"{"input":"api.example.com","status_code":200,"tech":null,"header":null,"cdn":null}"#,
        );

        assert_eq!(records.len(), 1);
        assert!(records[0].technologies().is_empty());
        assert!(records[0].headers().is_empty());
        assert!(!records[0].cdn);
        assert_eq!(records[0].to_asset().unwrap().domain, "api.example.com");
    }

    #[test]
    fn test_bad_lines_are_skipped() {
        let content = format!(
            "{}\nnot json at all\n\n{{\"input\":\"www.example.com\",\"status_code\":\"ok\"}}\n{{\"input\":\"www.example.com\"}}\n",
            JENKINS_LINE
        );
        let records = parse_records(&content);

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].domain(), Some("www.example.com"));
    }

    #[test]
    fn test_records_without_domain_are_not_assets() {
        let records = parse_records("{\"host\":\"203.0.113.1\"}\n{\"input\":\"  \"}");
        assert_eq!(records.len(), 2);
        assert!(to_assets(&records).is_empty());
    }

    #[tokio::test]
    async fn test_parse_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", JENKINS_LINE).unwrap();
        writeln!(file, "{{\"input\":\"www.example.com\",\"status_code\":200}}").unwrap();

        let records = parse_file(file.path()).await.unwrap();
        let assets = to_assets(&records);

        assert_eq!(assets.len(), 2);
        assert_eq!(assets[1].status_code, Some(200));
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = parse_file(&dir.path().join("results.json")).await.unwrap_err();
        assert!(matches!(err, ReconError::Read { .. }));
    }
}
