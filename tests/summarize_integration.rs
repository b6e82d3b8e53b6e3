use std::fs;

use ltlnorm_bench::report::SummaryDocument;
use ltlnorm_bench::summarize_cmd::{self, SummarizeOptions};
use tempfile::tempdir;

const HEADER: &str = "file,formula,already_normal,already_gfnorm,imp,time,init_size,init_dagsize,fin_size,fin_dagsize,final_normal,final_gfnorm\n";

fn write_results(dir: &std::path::Path) -> String {
    let rows = [
        "t.ltl,GFa,True,True,owl,4000000,2,2,4,4,True,True",
        "t.ltl,FGFa,False,False,owl,6000000,3,3,6,5,True,True",
        "t.ltl,GFa,True,True,cpp,1000000,2,2,2,2,True,True",
        "t.ltl,FGFa,False,False,cpp,2000000,3,3,3,3,True,False",
    ];
    let path = dir.join("result.csv");
    fs::write(&path, format!("{HEADER}{}\n", rows.join("\n"))).unwrap();
    path.display().to_string()
}

#[test]
fn summarizes_csv_produced_by_check() {
    let dir = tempdir().unwrap();
    let csv = write_results(dir.path());

    let summaries = summarize_cmd::collect_summaries(&[csv.clone()]).unwrap();
    assert_eq!(summaries.len(), 1);
    let summary = &summaries[0];
    assert_eq!(summary.implementations, vec!["owl", "cpp"]);
    assert_eq!(summary.formulae, 2);
    assert_eq!(summary.already_normalized, 50.0);

    let cpp = summary.implementation("cpp").unwrap();
    assert_eq!(cpp.fastest, 100.0);
    assert_eq!(cpp.strictly_smallest, 100.0);
    assert_eq!(cpp.total_time_ms, 3.0);
    assert_eq!(cpp.worst_blowup, Some(1.0));
    assert_eq!(cpp.not_gfnorm, 50.0);

    let owl = summary.implementation("owl").unwrap();
    assert_eq!(owl.fastest, 0.0);
    assert_eq!(owl.mean_blowup, Some(2.0));
}

#[test]
fn hash_prefix_ignores_already_normalized() {
    let dir = tempdir().unwrap();
    let csv = write_results(dir.path());

    let summaries = summarize_cmd::collect_summaries(&[format!("#{csv}")]).unwrap();
    let summary = &summaries[0];
    assert_eq!(summary.formulae, 1);
    assert_eq!(summary.file, csv);
    assert_eq!(summary.implementation("owl").unwrap().total_time_ms, 6.0);
}

#[test]
fn header_only_file_is_skipped() {
    let dir = tempdir().unwrap();
    let empty = dir.path().join("empty.csv");
    fs::write(&empty, HEADER).unwrap();

    let summaries =
        summarize_cmd::collect_summaries(&[empty.display().to_string()]).unwrap();
    assert!(summaries.is_empty());
}

#[test]
fn json_summary_document() {
    let dir = tempdir().unwrap();
    let csv = write_results(dir.path());
    let json = dir.path().join("summary.json");

    summarize_cmd::run(SummarizeOptions {
        inputs: vec![csv.clone(), format!("#{csv}")],
        output: Some(json.clone()),
        ..Default::default()
    })
    .unwrap();

    let doc: SummaryDocument = serde_json::from_str(&fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(doc.summaries.len(), 2);
    assert_eq!(doc.summaries[0].formulae, 2);
    assert_eq!(doc.summaries[1].formulae, 1);
    // built-in table, only the implementations present in the results
    let names: Vec<&String> = doc.environment.implementations.keys().collect();
    assert_eq!(names, vec!["cpp", "owl"]);
    assert!(doc.environment.machine.is_some());
}

#[test]
fn json_summary_records_configured_commands() {
    let dir = tempdir().unwrap();
    let csv = write_results(dir.path());
    let config = dir.path().join("implementations.toml");
    fs::write(
        &config,
        "[[implementation]]\nname = \"owl\"\ncommand = \"owl ltl-normalize --fast\"\n\n\
         [[implementation]]\nname = \"spot\"\ncommand = [\"ltlfilt\"]\n",
    )
    .unwrap();
    let json = dir.path().join("summary.json");

    let options = SummarizeOptions {
        inputs: vec![csv],
        output: Some(json.clone()),
        config: Some(config),
        ltlfilt: Some(dir.path().join("no-ltlfilt")),
    };
    summarize_cmd::run(options).unwrap();

    let doc: SummaryDocument = serde_json::from_str(&fs::read_to_string(&json).unwrap()).unwrap();
    let imps = &doc.environment.implementations;
    assert_eq!(imps.len(), 2);
    assert_eq!(imps["owl"], "owl ltl-normalize --fast");
    // cpp is in the results but not in this table
    assert_eq!(imps["cpp"], "");
    assert_eq!(doc.environment.ltlfilt_version, None);
}
