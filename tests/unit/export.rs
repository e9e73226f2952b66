//! In-memory filter/export runs over generated BLAST XML.

use blastsieve::api::ExportControl;
use blastsieve::config::ColumnSelection;
use blastsieve::report::{NumberStyle, OutputConfig};

use crate::helpers::*;

#[test]
fn test_best_hit_only_with_default_columns() {
    // query length 100; A passes every threshold, B is beyond max_rank
    let xml = blast_xml(
        "blastn",
        &[query(
            "query one",
            100,
            vec![
                hit("B", vec![hsp(10.0, 1e-1, 40, 100, 0)]),
                hit("A", vec![hsp(50.0, 1e-5, 90, 100, 0)]),
            ],
        )],
    );
    let cfg = config(ColumnSelection::default(), thresholds(1, 10, 1e-3, 50.0, 50.0));
    let (table, report, summary) = run_export(&xml, &cfg);

    let (header, rows) = split_table(&table);
    assert_eq!(
        header,
        vec![
            "Rank",
            "Target_Definition",
            "Hsp_num",
            "E-Value",
            "Query_Coverage(%)",
            "Identity(%)",
            "Accession"
        ]
    );
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0], vec!["1", "A", "1", "1e-05", "100.0", "90.0", "ACC_A"]);

    let blocks = split_blocks(&report);
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0][0], "> A");
    assert_eq!(blocks[0][1], "rank = 1\tExpect = 1e-05\tIdentities = 90.0");
    assert_eq!(blocks[0][2], "Query  ACGTTGCA");
    assert_eq!(blocks[0][3], "       |||| |||");
    assert_eq!(blocks[0][4], "Sbjct  ACGTAGCA");

    assert_eq!(summary.records_read, 1);
    assert_eq!(summary.rows_written, 1);
    assert_eq!(summary.selection.skipped_by_rank, 1);
    assert!(!summary.cancelled);
}

#[test]
fn test_rows_and_blocks_stay_in_parity() {
    let xml = blast_xml(
        "blastn",
        &[
            query(
                "q1",
                100,
                vec![
                    hit("h1", vec![hsp(80.0, 1e-20, 95, 100, 0), hsp(40.0, 1e-8, 60, 50, 2)]),
                    hit("h2", vec![hsp(60.0, 1e-10, 20, 100, 0)]),
                    hit("h3", vec![hsp(30.0, 1e-4, 90, 80, 0)]),
                ],
            ),
            query("q2", 50, vec![hit("h4", vec![hsp(20.0, 1e-3, 45, 50, 0)])]),
        ],
    );
    let cfg = config(ColumnSelection::all(), thresholds(5, 5, 1e-2, 50.0, 0.0));
    let (table, report, summary) = run_export(&xml, &cfg);

    let (_, rows) = split_table(&table);
    let blocks = split_blocks(&report);
    assert_eq!(rows.len(), blocks.len());
    assert_eq!(rows.len(), summary.rows_written);
    // h2 fails identity
    assert_eq!(summary.selection.rejected_identity, 1);
    assert_eq!(rows.len(), 4);
    for block in &blocks {
        assert_eq!(block.len(), 5);
    }
    assert!(!report.ends_with("\n\n"));
}

#[test]
fn test_every_row_respects_thresholds() {
    let xml = blast_xml(
        "blastn",
        &[query(
            "q",
            200,
            vec![
                hit("good", vec![hsp(90.0, 1e-30, 180, 190, 0)]),
                hit("high_evalue", vec![hsp(80.0, 0.5, 180, 190, 0)]),
                hit("low_identity", vec![hsp(70.0, 1e-10, 50, 190, 0)]),
                hit("short", vec![hsp(60.0, 1e-10, 40, 40, 0)]),
            ],
        )],
    );
    let cfg = config(ColumnSelection::default(), thresholds(10, 10, 1e-3, 80.0, 50.0));
    let (table, _, summary) = run_export(&xml, &cfg);

    let (header, rows) = split_table(&table);
    assert_eq!(rows.len(), 1);
    for row in &rows {
        let evalue: f64 = field(&header, row, "E-Value").parse().unwrap();
        let identity: f64 = field(&header, row, "Identity(%)").parse().unwrap();
        let coverage: f64 = field(&header, row, "Query_Coverage(%)").parse().unwrap();
        assert!(evalue <= 1e-3);
        assert!(identity >= 80.0);
        assert!(coverage >= 50.0);
    }
    assert_eq!(summary.selection.rejected_evalue, 1);
    assert_eq!(summary.selection.rejected_identity, 1);
    assert_eq!(summary.selection.rejected_coverage, 1);
    assert_eq!(summary.selection.hsps_rejected(), 3);
}

#[test]
fn test_thresholds_are_inclusive() {
    // identity 50/100 = 50.0, coverage (100 - 0)/200 = 50.0
    let xml = blast_xml(
        "blastn",
        &[query("q", 200, vec![hit("edge", vec![hsp(50.0, 1e-3, 50, 100, 0)])])],
    );
    let cfg = config(ColumnSelection::default(), thresholds(1, 1, 1e-3, 50.0, 50.0));
    let (table, _, _) = run_export(&xml, &cfg);
    let (header, rows) = split_table(&table);
    assert_eq!(rows.len(), 1);
    assert_eq!(field(&header, &rows[0], "Identity(%)"), "50.0");
    assert_eq!(field(&header, &rows[0], "Query_Coverage(%)"), "50.0");
}

#[test]
fn test_ranks_follow_best_score() {
    let xml = blast_xml(
        "blastn",
        &[query(
            "q",
            100,
            vec![
                hit("low", vec![hsp(10.0, 1e-5, 90, 100, 0)]),
                hit("high", vec![hsp(99.0, 1e-5, 90, 100, 0)]),
                hit("mid", vec![hsp(50.0, 1e-5, 90, 100, 0)]),
            ],
        )],
    );
    let cfg = config(ColumnSelection::default(), thresholds(3, 1, 1e-3, 0.0, 0.0));
    let (table, _, _) = run_export(&xml, &cfg);
    let (header, rows) = split_table(&table);
    let order: Vec<(&str, &str)> = rows
        .iter()
        .map(|r| (field(&header, r, "Rank"), field(&header, r, "Target_Definition")))
        .collect();
    assert_eq!(order, vec![("1", "high"), ("2", "mid"), ("3", "low")]);
}

#[test]
fn test_equal_scores_keep_document_order() {
    let xml = blast_xml(
        "blastn",
        &[query(
            "q",
            100,
            vec![
                hit("first", vec![hsp(42.0, 1e-5, 90, 100, 0)]),
                hit("second", vec![hsp(42.0, 1e-5, 90, 100, 0)]),
            ],
        )],
    );
    let cfg = config(ColumnSelection::default(), thresholds(2, 1, 1e-3, 0.0, 0.0));
    let (table, _, _) = run_export(&xml, &cfg);
    let (header, rows) = split_table(&table);
    assert_eq!(field(&header, &rows[0], "Target_Definition"), "first");
    assert_eq!(field(&header, &rows[1], "Target_Definition"), "second");
}

#[test]
fn test_hit_with_too_many_hsps_does_not_consume_rank() {
    let xml = blast_xml(
        "blastn",
        &[query(
            "q",
            100,
            vec![
                hit(
                    "busy",
                    vec![hsp(90.0, 1e-9, 90, 100, 0), hsp(80.0, 1e-9, 90, 100, 0)],
                ),
                hit("next", vec![hsp(70.0, 1e-9, 90, 100, 0)]),
            ],
        )],
    );
    let cfg = config(ColumnSelection::default(), thresholds(1, 1, 1e-3, 0.0, 0.0));
    let (table, _, summary) = run_export(&xml, &cfg);
    let (header, rows) = split_table(&table);
    assert_eq!(rows.len(), 1);
    assert_eq!(field(&header, &rows[0], "Target_Definition"), "next");
    assert_eq!(field(&header, &rows[0], "Rank"), "1");
    assert_eq!(summary.selection.skipped_by_hsp_count, 1);
}

#[test]
fn test_rejected_hit_still_consumes_rank() {
    let xml = blast_xml(
        "blastn",
        &[query(
            "q",
            100,
            vec![
                hit("bad", vec![hsp(90.0, 5.0, 90, 100, 0)]),
                hit("good", vec![hsp(70.0, 1e-9, 90, 100, 0)]),
            ],
        )],
    );
    let cfg = config(ColumnSelection::default(), thresholds(2, 1, 1e-3, 0.0, 0.0));
    let (table, _, _) = run_export(&xml, &cfg);
    let (header, rows) = split_table(&table);
    assert_eq!(rows.len(), 1);
    assert_eq!(field(&header, &rows[0], "Target_Definition"), "good");
    assert_eq!(field(&header, &rows[0], "Rank"), "2");
}

#[test]
fn test_hsp_num_is_hsp_count_of_hit() {
    let xml = blast_xml(
        "blastn",
        &[query(
            "q",
            100,
            vec![hit(
                "multi",
                vec![
                    hsp(90.0, 1e-9, 90, 100, 0),
                    hsp(80.0, 1e-9, 90, 100, 0),
                    hsp(70.0, 1e-9, 90, 100, 0),
                ],
            )],
        )],
    );
    let cfg = config(ColumnSelection::default(), thresholds(1, 3, 1e-3, 0.0, 0.0));
    let (table, report, _) = run_export(&xml, &cfg);
    let (header, rows) = split_table(&table);
    assert_eq!(rows.len(), 3);
    for row in &rows {
        assert_eq!(field(&header, row, "Hsp_num"), "3");
        assert_eq!(field(&header, row, "Rank"), "1");
    }
    assert_eq!(split_blocks(&report).len(), 3);
}

#[test]
fn test_record_without_hits_writes_nothing() {
    let xml = blast_xml("blastn", &[query("lonely", 100, Vec::new())]);
    let cfg = config(ColumnSelection::default(), thresholds(1, 1, 1.0, 0.0, 0.0));
    let (table, report, summary) = run_export(&xml, &cfg);
    assert_eq!(table.lines().count(), 1);
    assert!(report.is_empty());
    assert_eq!(summary.records_read, 1);
    assert_eq!(summary.records_without_hits, 1);
    assert_eq!(summary.rows_written, 0);
}

#[test]
fn test_empty_input_writes_header_only() {
    let xml = blast_xml("blastn", &[]);
    let cfg = config(ColumnSelection::all(), thresholds(1, 1, 1.0, 0.0, 0.0));
    let (table, report, summary) = run_export(&xml, &cfg);
    assert_eq!(table.lines().count(), 1);
    assert!(table.starts_with("Input_query-ID,Query_Length,Rank,Target_Definition"));
    assert!(report.is_empty());
    assert_eq!(summary.records_read, 0);
}

#[test]
fn test_zero_query_length_gives_zero_coverage() {
    let xml = blast_xml(
        "blastn",
        &[query("q", 0, vec![hit("h", vec![hsp(50.0, 1e-9, 90, 100, 0)])])],
    );
    let passing = config(ColumnSelection::default(), thresholds(1, 1, 1e-3, 0.0, 0.0));
    let (table, _, _) = run_export(&xml, &passing);
    let (header, rows) = split_table(&table);
    assert_eq!(rows.len(), 1);
    assert_eq!(field(&header, &rows[0], "Query_Coverage(%)"), "0.0");

    let strict = config(ColumnSelection::default(), thresholds(1, 1, 1e-3, 0.0, 1.0));
    let (table, _, summary) = run_export(&xml, &strict);
    assert_eq!(table.lines().count(), 1);
    assert_eq!(summary.selection.rejected_coverage, 1);
}

#[test]
fn test_gaps_reduce_coverage() {
    // (100 - 20) / 100
    let xml = blast_xml(
        "blastn",
        &[query("q", 100, vec![hit("gappy", vec![hsp(50.0, 1e-9, 90, 100, 20)])])],
    );
    let cfg = config(ColumnSelection::default(), thresholds(1, 1, 1e-3, 0.0, 0.0));
    let (table, _, _) = run_export(&xml, &cfg);
    let (header, rows) = split_table(&table);
    assert_eq!(field(&header, &rows[0], "Query_Coverage(%)"), "80.0");
}

#[test]
fn test_optional_columns_and_metadata() {
    let mut h = hsp(50.0, 1e-5, 90, 100, 0);
    h.bit_score = 92.5;
    let xml = blast_xml("blastn", &[query("my query", 100, vec![hit("A", vec![h])])]);
    let cfg = config(ColumnSelection::all(), thresholds(1, 1, 1e-3, 0.0, 0.0));
    let (table, report, _) = run_export(&xml, &cfg);

    let (header, rows) = split_table(&table);
    assert_eq!(header.len(), 17);
    let row = &rows[0];
    assert_eq!(field(&header, row, "Input_query-ID"), "my query");
    assert_eq!(field(&header, row, "Query_Length"), "100");
    assert_eq!(field(&header, row, "Target_Length"), "1000");
    assert_eq!(field(&header, row, "Score"), "92.5");
    assert_eq!(field(&header, row, "Query_Start"), "1");
    assert_eq!(field(&header, row, "Query_End"), "100");
    assert_eq!(field(&header, row, "Target_Start"), "11");
    assert_eq!(field(&header, row, "Target_End"), "110");
    assert_eq!(field(&header, row, "Strand"), "1");
    assert_eq!(field(&header, row, "Match_Length"), "100");

    let blocks = split_blocks(&report);
    assert_eq!(
        blocks[0][1],
        "rank = 1\tScore = 92.5\tExpect = 1e-05\tIdentities = 90.0\tStrand = 1"
    );
}

#[test]
fn test_minus_strand_flag() {
    let mut h = hsp(50.0, 1e-5, 90, 100, 0);
    h.hit_frame = -1;
    let xml = blast_xml("blastn", &[query("q", 100, vec![hit("rev", vec![h])])]);
    let mut columns = ColumnSelection::default();
    columns.strand = true;
    let cfg = config(columns, thresholds(1, 1, 1e-3, 0.0, 0.0));
    let (table, report, _) = run_export(&xml, &cfg);
    let (header, rows) = split_table(&table);
    assert_eq!(field(&header, &rows[0], "Strand"), "0");
    assert!(report.contains("Strand = 0"));
}

#[test]
fn test_protein_search_has_no_strand() {
    let xml = blast_xml(
        "blastp",
        &[query("q", 100, vec![hit("prot", vec![hsp(50.0, 1e-5, 90, 100, 0)])])],
    );
    let mut columns = ColumnSelection::default();
    columns.strand = true;
    let cfg = config(columns, thresholds(1, 1, 1e-3, 0.0, 0.0));
    let (table, _, _) = run_export(&xml, &cfg);
    let (header, rows) = split_table(&table);
    assert_eq!(field(&header, &rows[0], "Strand"), "0");
}

#[test]
fn test_definition_with_delimiter_is_quoted() {
    let xml = blast_xml(
        "blastn",
        &[query(
            "q",
            100,
            vec![hit("Gene X, \"partial\" cds", vec![hsp(50.0, 1e-5, 90, 100, 0)])],
        )],
    );
    let cfg = config(ColumnSelection::default(), thresholds(1, 1, 1e-3, 0.0, 0.0));
    let (table, report, _) = run_export(&xml, &cfg);
    assert!(table.contains(",\"Gene X, \"\"partial\"\" cds\","));
    // the alignment report keeps the definition as is
    assert!(report.starts_with("> Gene X, \"partial\" cds\n"));
}

#[test]
fn test_tab_delimiter_and_ncbi_numbers() {
    let xml = blast_xml(
        "blastn",
        &[query("q", 100, vec![hit("A, B", vec![hsp(50.0, 1e-5, 90, 100, 0)])])],
    );
    let cfg = config(ColumnSelection::default(), thresholds(1, 1, 1e-3, 0.0, 0.0));
    let output = OutputConfig {
        delimiter: '\t',
        number_style: NumberStyle::Ncbi,
    };
    let (table, report, _) = run_export_with(&xml, &cfg, output, &ExportControl::new());
    let mut lines = table.lines();
    assert_eq!(
        lines.next().unwrap(),
        "Rank\tTarget_Definition\tHsp_num\tE-Value\tQuery_Coverage(%)\tIdentity(%)\tAccession"
    );
    let row: Vec<&str> = lines.next().unwrap().split('\t').collect();
    assert_eq!(row[1], "A, B");
    assert_eq!(row[3], "1.00e-05");
    assert!(report.contains("Expect = 1.00e-05"));
}

#[test]
fn test_stop_before_start_writes_header_only() {
    let xml = blast_xml(
        "blastn",
        &[query("q", 100, vec![hit("A", vec![hsp(50.0, 1e-5, 90, 100, 0)])])],
    );
    let cfg = config(ColumnSelection::default(), thresholds(1, 1, 1e-3, 0.0, 0.0));
    let control = ExportControl::new();
    control.request_stop();
    let (table, report, summary) =
        run_export_with(&xml, &cfg, OutputConfig::default(), &control);
    assert_eq!(table.lines().count(), 1);
    assert!(report.is_empty());
    assert!(summary.cancelled);
    assert_eq!(summary.records_read, 0);
}

#[test]
fn test_stop_between_records() {
    use blastsieve::api::export_records;
    use blastsieve::format::BlastXmlReader;
    use blastsieve::report::{PairwiseWriter, TableWriter};

    let xml = blast_xml(
        "blastn",
        &[
            query("q1", 100, vec![hit("A", vec![hsp(50.0, 1e-5, 90, 100, 0)])]),
            query("q2", 100, vec![hit("B", vec![hsp(50.0, 1e-5, 90, 100, 0)])]),
            query("q3", 100, vec![hit("C", vec![hsp(50.0, 1e-5, 90, 100, 0)])]),
        ],
    );
    let cfg = config(ColumnSelection::default(), thresholds(1, 1, 1e-3, 0.0, 0.0));
    let output = OutputConfig::default();
    let mut table = TableWriter::new(Vec::new(), cfg.columns(), output);
    let mut pairwise = PairwiseWriter::new(Vec::new(), cfg.columns(), output);
    let control = ExportControl::new();
    let stopper = control.clone();

    let summary = export_records(
        BlastXmlReader::new(xml.as_bytes()),
        &cfg,
        &mut table,
        &mut pairwise,
        &control,
        |progress| {
            if progress.records_read == 1 {
                stopper.request_stop();
            }
        },
    )
    .unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.records_read, 1);
    assert_eq!(summary.rows_written, 1);
    assert_eq!(table.rows_written(), 1);
    assert_eq!(pairwise.blocks_written(), 1);
}

#[test]
fn test_export_is_deterministic() {
    let xml = blast_xml(
        "blastn",
        &[query(
            "q",
            100,
            vec![
                hit("x", vec![hsp(50.0, 1e-5, 90, 100, 0)]),
                hit("y", vec![hsp(50.0, 1e-6, 95, 100, 0)]),
            ],
        )],
    );
    let cfg = config(ColumnSelection::all(), thresholds(2, 1, 1e-3, 0.0, 0.0));
    let first = run_export(&xml, &cfg);
    let second = run_export(&xml, &cfg);
    assert_eq!(first.0, second.0);
    assert_eq!(first.1, second.1);
    assert_eq!(first.2, second.2);
}

#[test]
fn test_parse_error_is_reported_with_record() {
    use blastsieve::FilterError;

    let xml = blast_xml(
        "blastn",
        &[query("q", 100, vec![hit("A", vec![hsp(50.0, 1e-5, 90, 100, 0)])])],
    )
    .replace("<Hsp_evalue>1e-5</Hsp_evalue>", "<Hsp_evalue>not-a-number</Hsp_evalue>");
    let cfg = config(ColumnSelection::default(), thresholds(1, 1, 1e-3, 0.0, 0.0));
    let output = OutputConfig::default();
    let mut table = blastsieve::report::TableWriter::new(Vec::new(), cfg.columns(), output);
    let mut pairwise = blastsieve::report::PairwiseWriter::new(Vec::new(), cfg.columns(), output);
    let result = blastsieve::api::export_records(
        blastsieve::format::BlastXmlReader::new(xml.as_bytes()),
        &cfg,
        &mut table,
        &mut pairwise,
        &ExportControl::new(),
        |_| {},
    );
    match result {
        Err(FilterError::InputParse { record, .. }) => assert_eq!(record, 1),
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[test]
fn test_all_gap_alignment_has_zero_coverage() {
    let xml = blast_xml(
        "blastn",
        &[query("q", 100, vec![hit("gaps", vec![hsp(50.0, 1e-9, 0, 30, 30)])])],
    );
    let strict = config(ColumnSelection::default(), thresholds(1, 1, 1e-3, 0.0, 10.0));
    let (_, report, summary) = run_export(&xml, &strict);
    assert!(report.is_empty());
    assert_eq!(summary.selection.rejected_coverage, 1);

    let lenient = config(ColumnSelection::default(), thresholds(1, 1, 1e-3, 0.0, 0.0));
    let (table, _, _) = run_export(&xml, &lenient);
    let (header, rows) = split_table(&table);
    assert_eq!(rows.len(), 1);
    assert_eq!(field(&header, &rows[0], "Query_Coverage(%)"), "0.0");
    assert_eq!(field(&header, &rows[0], "Identity(%)"), "0.0");
}
