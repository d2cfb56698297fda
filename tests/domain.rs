use std::collections::HashSet;

use reslink::domain::{
    DataId, FieldSelector, GenomeName, Resource, link_file_name, project_link_file_name,
    project_rules,
};

#[test]
fn link_names_are_deterministic() {
    let genome: GenomeName = "hg38".parse().unwrap();
    let field = FieldSelector::Named("bam".to_string());

    let first = link_file_name(DataId::new(123), "sample-a", &field, &genome, "alignment.bam");
    let second = link_file_name(DataId::new(123), "sample-a", &field, &genome, "alignment.bam");
    assert_eq!(first, second);
    assert_eq!(first, "00123_sample-a_bam_HG38.bam");
}

#[test]
fn project_rule_fields_produce_distinct_names() {
    // Same data object linked through every project rule field still yields
    // unique names, because the field is part of the name.
    let genome: GenomeName = "hg38".parse().unwrap();
    let names: HashSet<String> = project_rules()
        .iter()
        .map(|rule| link_file_name(DataId::new(77), "s", &rule.field, &genome, "out.bed"))
        .collect();

    let distinct_fields: HashSet<String> = project_rules()
        .iter()
        .map(|rule| rule.field.to_string())
        .collect();
    assert_eq!(names.len(), distinct_fields.len());
}

#[test]
fn project_names_keep_raw_file_names() {
    assert_eq!(
        project_link_file_name(DataId::new(1), "peaks.xls"),
        "00001_peaks.xls"
    );
    assert_eq!(
        project_link_file_name(DataId::new(99999), "x"),
        "99999_x"
    );
}

#[test]
fn resource_specifier_round_trip() {
    for input in ["sample:123", "collection:7"] {
        let resource: Resource = input.parse().unwrap();
        assert_eq!(resource.to_string(), input);
    }

    assert!("sample:abc".parse::<Resource>().is_err());
    assert!("123".parse::<Resource>().is_err());
}
