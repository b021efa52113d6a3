use graph_roots::ingest::{MemorySource, Record};
use graph_roots::report::{Cell, NODES_BY_LABELS, NODE_TO_ROOT_MAPPING};
use graph_roots::sink::MemorySink;
use graph_roots::{
    CsvDirSink, CsvSource, JsonDirSink, NodeId, OutputFormat, Pipeline, PipelineConfig, Stage,
};
use std::fs;

fn node(id: &str, labels: &str, properties: &str) -> Record {
    Record::new()
        .with("id(n)", id)
        .with("labels(n)", labels)
        .with("properties(n)", properties)
}

fn edge(id: &str, source: &str, target: &str) -> Record {
    Record::new()
        .with("relationship_id", id)
        .with("relationship_type", "RESOURCE")
        .with("relationship_properties", "{}")
        .with("source_id", source)
        .with("target_id", target)
}

fn pipeline() -> Pipeline {
    Pipeline::new(PipelineConfig::default()).unwrap()
}

#[test]
fn test_account_and_resource() {
    let source = MemorySource::new(
        vec![
            node("1", "[Account]", "{}"),
            node("2", "[Resource]", "{arn: \"arn:aws:iam::123:role/Foo\"}"),
        ],
        vec![edge("10", "1", "2")],
    );

    let output = pipeline().process(&source).unwrap();
    assert_eq!(output.roots.root_set().len(), 1);
    assert!(output.roots.is_root(&NodeId::from(1)));
    assert_eq!(output.roots.root_of(&NodeId::from(1)), Some(&NodeId::from(1)));
    assert_eq!(output.roots.root_of(&NodeId::from(2)), Some(&NodeId::from(1)));

    let resource = output
        .reports
        .nodes_by_labels
        .table("Resource")
        .unwrap();
    assert_eq!(
        resource.columns,
        vec!["node_id", "root_id", "account_name", "arn"]
    );
    assert_eq!(resource.cell(0, "node_id"), Some(&Cell::Integer(2)));
    assert_eq!(resource.cell(0, "root_id"), Some(&Cell::Integer(1)));
    assert_eq!(
        resource.cell(0, "account_name"),
        Some(&Cell::String("Node_1".to_string()))
    );

    let mapping = output.reports.mapping_table().unwrap();
    assert_eq!(mapping.row_count(), 1);
    assert_eq!(
        mapping.cell(0, "node_label"),
        Some(&Cell::String("Resource".to_string()))
    );
    assert_eq!(
        mapping.cell(0, "root_label"),
        Some(&Cell::String("Account".to_string()))
    );
}

#[test]
fn test_two_node_cycle() {
    let source = MemorySource::new(
        vec![node("a", "[Group]", "{}"), node("b", "[Group]", "{}")],
        vec![edge("1", "a", "b"), edge("2", "b", "a")],
    );

    let output = pipeline().process(&source).unwrap();
    assert!(output.roots.root_set().is_empty());
    assert_eq!(output.roots.root_of(&NodeId::from("a")), Some(&NodeId::from("a")));
    assert_eq!(output.roots.root_of(&NodeId::from("b")), Some(&NodeId::from("b")));
    assert_eq!(output.reports.mapping_table().unwrap().row_count(), 0);

    let group = output.reports.nodes_by_labels.table("Group").unwrap();
    assert_eq!(group.cell(1, "root_id"), Some(&Cell::String("b".to_string())));
    assert_eq!(
        group.cell(1, "account_name"),
        Some(&Cell::String("Node_b".to_string()))
    );
}

#[test]
fn test_multi_label_node() {
    let source = MemorySource::new(
        vec![node("5", "[Role, Taggable]", "{name: admin, active: true}")],
        vec![],
    );

    let output = pipeline().process(&source).unwrap();
    assert_eq!(output.rows.len(), 2);
    assert_eq!(output.rows[0].properties, output.rows[1].properties);
    assert_eq!(output.rows[0].all_labels, "Role|Taggable");

    let tables = &output.reports.nodes_by_labels;
    let role = tables.table("Role").unwrap();
    let taggable = tables.table("Taggable").unwrap();
    assert_eq!(role.rows, taggable.rows);
    assert_eq!(
        role.columns,
        vec!["node_id", "root_id", "account_name", "name", "active"]
    );
    assert_eq!(
        role.cell(0, "account_name"),
        Some(&Cell::String("admin".to_string()))
    );
}

#[test]
fn test_csv_export_end_to_end() {
    let input = tempfile::tempdir().unwrap();
    let nodes_path = input.path().join("export0.csv");
    let edges_path = input.path().join("export1.csv");
    fs::write(
        &nodes_path,
        "id(n),labels(n),properties(n)\n\
         1,[Account],\"{name: prod, account_id: 123456789012}\"\n\
         2,\"[AWSRole, Taggable]\",\"{arn: 'arn:aws:iam::123456789012:role/Admin', tags: [a, b]}\"\n\
         3,[S3Bucket],{broken\n\
         4,,\n",
    )
    .unwrap();
    fs::write(
        &edges_path,
        "relationship_id,relationship_type,relationship_properties,source_id,target_id\n\
         0,RESOURCE,{},1,2\n\
         1,RESOURCE,{},1,3\n\
         2,RESOURCE,{},99,4\n",
    )
    .unwrap();

    let output_dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig {
        nodes_path: Some(nodes_path),
        edges_path: Some(edges_path),
        output_dir: output_dir.path().to_path_buf(),
        ..PipelineConfig::default()
    };
    let pipeline = Pipeline::new(config).unwrap();
    let source = pipeline.csv_source().unwrap();
    let mut sink = CsvDirSink::new(output_dir.path());
    let summary = pipeline.run(&source, &mut sink).unwrap();

    assert_eq!(summary.ingest.nodes, 4);
    assert_eq!(summary.ingest.dangling_edges, 1);
    assert_eq!(summary.ingest.degraded_properties, 1);
    assert_eq!(summary.ingest.defaulted_labels, 1);
    assert_eq!(summary.expanded_rows, 5);
    assert_eq!(summary.roots.root_count, 1);
    assert_eq!(summary.roots.unresolved, 1);
    assert_eq!(summary.mapping_rows, 2);

    let labels_dir = output_dir.path().join(NODES_BY_LABELS);
    let role = fs::read_to_string(labels_dir.join("AWSRole.csv")).unwrap();
    assert_eq!(
        role,
        "node_id,root_id,account_name,arn,tags\n\
         2,1,prod,arn:aws:iam::123456789012:role/Admin,\"[a, b]\"\n"
    );
    let bucket = fs::read_to_string(labels_dir.join("S3Bucket.csv")).unwrap();
    assert_eq!(
        bucket,
        "node_id,root_id,account_name,raw_properties\n3,1,prod,{broken\n"
    );
    assert!(labels_dir.join("Unknown.csv").exists());

    let mapping = fs::read_to_string(
        output_dir
            .path()
            .join(NODE_TO_ROOT_MAPPING)
            .join("node_to_root_mapping.csv"),
    )
    .unwrap();
    assert_eq!(
        mapping,
        "node_id,node_label,root_id,root_label,node_all_labels,root_all_labels\n\
         2,AWSRole,1,Account,AWSRole|Taggable,Account\n\
         3,S3Bucket,1,Account,S3Bucket,Account\n"
    );
}

#[test]
fn test_gzip_input_and_json_output() {
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    let input = tempfile::tempdir().unwrap();
    let nodes_path = input.path().join("nodes.csv.gz");
    let mut encoder = GzEncoder::new(fs::File::create(&nodes_path).unwrap(), Compression::default());
    encoder
        .write_all(b"id,labels,properties\n1,[Account],{}\n2,[Role],{}\n")
        .unwrap();
    encoder.finish().unwrap();
    let edges_path = input.path().join("edges.csv");
    fs::write(&edges_path, "source_id,target_id\n1,2\n").unwrap();

    let output_dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig {
        nodes_path: Some(nodes_path),
        edges_path: Some(edges_path),
        output_dir: output_dir.path().to_path_buf(),
        output_format: OutputFormat::Json,
        ..PipelineConfig::default()
    };
    let pipeline = Pipeline::new(config).unwrap();
    let source = CsvSource::new(
        pipeline.config().nodes_path.clone().unwrap(),
        pipeline.config().edges_path.clone().unwrap(),
    );
    let mut sink = pipeline.sink();
    pipeline.run(&source, sink.as_mut()).unwrap();

    let text = fs::read_to_string(output_dir.path().join("node_to_root_mapping.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(
        value["node_to_root_mapping"][0]["root_label"],
        serde_json::json!("Account")
    );

    let sink = JsonDirSink::new(output_dir.path());
    assert!(sink.workbook_path(NODES_BY_LABELS).exists());
}

#[test]
fn test_schema_error_leaves_no_output() {
    let output_dir = tempfile::tempdir().unwrap();
    let source = MemorySource::new(
        vec![node("1", "[Account]", "{}")],
        vec![Record::new().with("source_id", "1")],
    );

    let mut sink = CsvDirSink::new(output_dir.path());
    let err = pipeline().run(&source, &mut sink).unwrap_err();

    assert_eq!(err.stage(), Some(Stage::LoadRecords));
    assert!(err.to_string().contains("target_id"));
    assert_eq!(fs::read_dir(output_dir.path()).unwrap().count(), 0);
}

#[test]
fn test_failed_write_leaves_no_workbook() {
    let output_dir = tempfile::tempdir().unwrap();
    fs::write(output_dir.path().join(NODE_TO_ROOT_MAPPING), "stray").unwrap();
    let source = MemorySource::new(
        vec![node("1", "[Account]", "{}"), node("2", "[Role]", "{}")],
        vec![edge("10", "1", "2")],
    );

    let mut sink = CsvDirSink::new(output_dir.path());
    let err = pipeline().run(&source, &mut sink).unwrap_err();

    assert_eq!(err.stage(), Some(Stage::WriteReports));
    assert!(!output_dir.path().join(NODES_BY_LABELS).exists());
    let entries: Vec<_> = fs::read_dir(output_dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(entries, vec![std::ffi::OsString::from(NODE_TO_ROOT_MAPPING)]);
}

#[test]
fn test_repeated_runs_are_identical() {
    let source = MemorySource::new(
        vec![
            node("1", "[Account]", "{name: prod}"),
            node("2", "[Role]", "{}"),
            node("3", "[Policy]", "{}"),
            node("4", "[Policy]", "{}"),
        ],
        vec![
            edge("0", "1", "2"),
            edge("1", "2", "3"),
            edge("2", "3", "4"),
            edge("3", "4", "3"),
        ],
    );

    let mut first = MemorySink::new();
    let mut second = MemorySink::new();
    pipeline().run(&source, &mut first).unwrap();
    pipeline().run(&source, &mut second).unwrap();
    assert_eq!(first.workbooks, second.workbooks);

    let mapping = first.workbook(NODE_TO_ROOT_MAPPING).unwrap();
    assert_eq!(mapping.row_count(), 3);
}
