use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ReslinkError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataId(u64);

impl DataId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub fn padded(&self) -> String {
        format!("{:05}", self.0)
    }
}

impl fmt::Display for DataId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataStatus {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "ER")]
    Error,
    #[serde(rename = "PR")]
    Processing,
    #[serde(rename = "WT")]
    Waiting,
    #[serde(rename = "UP")]
    Uploading,
}

impl DataStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataStatus::Ok => "OK",
            DataStatus::Error => "ER",
            DataStatus::Processing => "PR",
            DataStatus::Waiting => "WT",
            DataStatus::Uploading => "UP",
        }
    }
}

/// Process type string such as `data:alignment:bam:bowtie2:`; filters match
/// by prefix, so a trailing colon is allowed but not required.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DataType(String);

impl DataType {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, concrete: &DataType) -> bool {
        concrete.0.starts_with(self.0.as_str())
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DataType {
    type Err = ReslinkError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_string();
        let pattern = Regex::new(r"^data(:[a-z0-9_-]+)+:?$").expect("valid regex");
        if !pattern.is_match(&normalized) {
            return Err(ReslinkError::InvalidDataType(value.to_string()));
        }
        Ok(Self(normalized))
    }
}

impl TryFrom<String> for DataType {
    type Error = ReslinkError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DataType> for String {
    fn from(value: DataType) -> Self {
        value.0
    }
}

/// Genome label, normalized to uppercase on parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GenomeName(String);

impl GenomeName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GenomeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for GenomeName {
    type Err = ReslinkError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_uppercase();
        if normalized.is_empty() {
            return Err(ReslinkError::InvalidGenomeName(value.to_string()));
        }
        Ok(Self(normalized))
    }
}

impl TryFrom<String> for GenomeName {
    type Error = ReslinkError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<GenomeName> for String {
    fn from(value: GenomeName) -> Self {
        value.0
    }
}

/// `All` links every file on the object, with no field filter applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldSelector {
    All,
    Named(String),
}

impl FieldSelector {
    pub fn filter_name(&self) -> Option<&str> {
        match self {
            FieldSelector::All => None,
            FieldSelector::Named(name) => Some(name),
        }
    }

    pub fn is_named(&self, name: &str) -> bool {
        matches!(self, FieldSelector::Named(value) if value == name)
    }
}

impl fmt::Display for FieldSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldSelector::All => write!(f, "ALL"),
            FieldSelector::Named(name) => write!(f, "{name}"),
        }
    }
}

impl From<String> for FieldSelector {
    fn from(value: String) -> Self {
        if value == "ALL" {
            FieldSelector::All
        } else {
            FieldSelector::Named(value)
        }
    }
}

impl From<FieldSelector> for String {
    fn from(value: FieldSelector) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRule {
    #[serde(rename = "type")]
    pub data_type: DataType,
    pub field: FieldSelector,
    pub subfolder: String,
}

impl LinkRule {
    pub fn new(data_type: &str, field: &str, subfolder: &str) -> Result<Self, ReslinkError> {
        Ok(Self {
            data_type: data_type.parse()?,
            field: FieldSelector::from(field.to_string()),
            subfolder: subfolder.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Sample(u64),
    Collection(u64),
}

impl Resource {
    pub fn id(&self) -> u64 {
        match self {
            Resource::Sample(id) | Resource::Collection(id) => *id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Resource::Sample(_) => "sample",
            Resource::Collection(_) => "collection",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id())
    }
}

impl FromStr for Resource {
    type Err = ReslinkError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let (kind, rest) = trimmed
            .split_once(':')
            .ok_or_else(|| ReslinkError::InvalidResource(value.to_string()))?;
        let id = rest
            .parse::<u64>()
            .map_err(|_| ReslinkError::InvalidResource(value.to_string()))?;
        match kind {
            "sample" => Ok(Resource::Sample(id)),
            "collection" => Ok(Resource::Collection(id)),
            _ => Err(ReslinkError::InvalidResource(value.to_string())),
        }
    }
}

/// Zero-padded id, slug, field and genome; the source file's extension
/// (everything after the first dot) is carried over when present.
pub fn link_file_name(
    id: DataId,
    slug: &str,
    field: &FieldSelector,
    genome: &GenomeName,
    file_name: &str,
) -> String {
    let mut name = format!("{}_{}_{}_{}", id.padded(), slug, field, genome);
    if let Some((_, extension)) = file_name.split_once('.') {
        name = format!("{name}.{extension}");
    }
    name
}

pub fn project_link_file_name(id: DataId, file_name: &str) -> String {
    format!("{}_{}", id.padded(), file_name)
}

/// The fixed rule set of the project linker.
pub fn project_rules() -> Vec<LinkRule> {
    [
        ("data:alignment:bam:bowtie2:", "bam", "bams"),
        ("data:alignment:bam:bowtie2:", "bai", "bams"),
        ("data:alignment:bam:hisat2:", "bam", "bams"),
        ("data:alignment:bam:hisat2:", "bai", "bams"),
        ("data:chipseq:macs14:", "peaks_bed", "macs14"),
        ("data:chipseq:rose2:", "ALL", "rose2"),
        ("data:cufflinks:cuffquant:", "ALL", "cufflinks/cuffquant"),
        ("data:expressionset:cuffnorm:", "ALL", "cufflinks/cuffnorm"),
    ]
    .into_iter()
    .map(|(data_type, field, subfolder)| {
        LinkRule::new(data_type, field, subfolder).expect("fixed rule set is valid")
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_data_type_valid() {
        let dt: DataType = "data:alignment:bam:bowtie2:".parse().unwrap();
        assert_eq!(dt.as_str(), "data:alignment:bam:bowtie2:");

        let no_trailing: DataType = "data:chipseq:macs14".parse().unwrap();
        assert_eq!(no_trailing.as_str(), "data:chipseq:macs14");
    }

    #[test]
    fn parse_data_type_invalid() {
        let err = "alignment:bam".parse::<DataType>().unwrap_err();
        assert_matches!(err, ReslinkError::InvalidDataType(_));

        let err = "data:".parse::<DataType>().unwrap_err();
        assert_matches!(err, ReslinkError::InvalidDataType(_));
    }

    #[test]
    fn data_type_prefix_match() {
        let filter: DataType = "data:chipseq:macs14".parse().unwrap();
        let concrete: DataType = "data:chipseq:macs14:".parse().unwrap();
        assert!(filter.matches(&concrete));
        assert!(!concrete.matches(&filter));
    }

    #[test]
    fn genome_name_uppercased() {
        let genome: GenomeName = "hg38".parse().unwrap();
        assert_eq!(genome.as_str(), "HG38");
    }

    #[test]
    fn genome_name_empty_rejected() {
        let err = "  ".parse::<GenomeName>().unwrap_err();
        assert_matches!(err, ReslinkError::InvalidGenomeName(_));
    }

    #[test]
    fn parse_resource_specifier() {
        let sample: Resource = "sample:123".parse().unwrap();
        assert_eq!(sample, Resource::Sample(123));

        let collection: Resource = "collection:7".parse().unwrap();
        assert_eq!(collection, Resource::Collection(7));

        let err = "project:1".parse::<Resource>().unwrap_err();
        assert_matches!(err, ReslinkError::InvalidResource(_));
    }

    #[test]
    fn field_selector_all_round_trip() {
        let rule: LinkRule = serde_json::from_str(
            r#"{"type": "data:chipseq:rose2:", "field": "ALL", "subfolder": "rose2"}"#,
        )
        .unwrap();
        assert_eq!(rule.field, FieldSelector::All);
        assert!(rule.field.filter_name().is_none());

        let json = serde_json::to_string(&rule).unwrap();
        assert!(json.contains(r#""field":"ALL""#));
    }

    #[test]
    fn link_name_worked_example() {
        let genome: GenomeName = "hg38".parse().unwrap();
        let field = FieldSelector::Named("bam".to_string());
        let name = link_file_name(DataId::new(123), "sample-a", &field, &genome, "alignment.bam");
        assert_eq!(name, "00123_sample-a_bam_HG38.bam");
    }

    #[test]
    fn link_name_preserves_full_extension() {
        let genome: GenomeName = "mm10".parse().unwrap();
        let field = FieldSelector::Named("bai".to_string());
        let name = link_file_name(
            DataId::new(7),
            "input",
            &field,
            &genome,
            "alignment.bam.bai",
        );
        assert_eq!(name, "00007_input_bai_MM10.bam.bai");
    }

    #[test]
    fn link_name_without_extension() {
        let genome: GenomeName = "hg38".parse().unwrap();
        let field = FieldSelector::Named("report".to_string());
        let name = link_file_name(DataId::new(1), "s", &field, &genome, "summary");
        assert_eq!(name, "00001_s_report_HG38");
    }

    #[test]
    fn link_names_unique_per_id_field_genome() {
        let hg38: GenomeName = "hg38".parse().unwrap();
        let mm10: GenomeName = "mm10".parse().unwrap();
        let bam = FieldSelector::Named("bam".to_string());
        let bai = FieldSelector::Named("bai".to_string());

        let names = [
            link_file_name(DataId::new(1), "s", &bam, &hg38, "a.bam"),
            link_file_name(DataId::new(2), "s", &bam, &hg38, "a.bam"),
            link_file_name(DataId::new(1), "s", &bai, &hg38, "a.bam"),
            link_file_name(DataId::new(1), "s", &bam, &mm10, "a.bam"),
        ];
        let unique: std::collections::HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn project_link_name_uses_raw_file_name() {
        assert_eq!(
            project_link_file_name(DataId::new(123), "alignment.bam"),
            "00123_alignment.bam"
        );
    }

    #[test]
    fn project_rule_set_shape() {
        let rules = project_rules();
        assert_eq!(rules.len(), 8);
        assert!(rules.iter().any(|rule| rule.field == FieldSelector::All));
        assert!(
            rules
                .iter()
                .any(|rule| rule.subfolder == "cufflinks/cuffnorm")
        );
    }
}
