use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use groupcheck::data_models::Verdict;
use groupcheck::error::TableError;
use groupcheck::table::{self, columns};

mod test_helpers {
    use super::*;

    pub fn write_input(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("queries.csv");
        fs::write(&path, contents).unwrap();
        path
    }

    pub fn read_rows(path: &PathBuf) -> Vec<Vec<String>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(path)
            .unwrap();
        reader
            .records()
            .map(|r| r.unwrap().iter().map(|f| f.to_string()).collect())
            .collect()
    }
}

use test_helpers::*;

mod load_tests {
    use super::*;

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope.csv");
        match table::load(&path) {
            Err(TableError::NotFound(p)) => assert_eq!(p, path),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_loads_rows_in_order() {
        let dir = TempDir::new().unwrap();
        let path = write_input(
            &dir,
            "Query,Expected Groups\n\
             \"\"\"Top Trader Jobe Goods\"\"\",\"2324243,425343141\"\n\
             plain query,007\n",
        );
        let loaded = table::load(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.rows[0].query, "\"Top Trader Jobe Goods\"");
        assert_eq!(loaded.rows[0].expected_groups, "2324243,425343141");
        assert_eq!(loaded.rows[1].query, "plain query");
        assert_eq!(loaded.rows[1].expected_groups, "007");
        assert!(loaded.rows.iter().all(|r| r.verdict.is_none()));
    }

    #[test]
    fn test_extra_columns_and_column_order() {
        let dir = TempDir::new().unwrap();
        let path = write_input(
            &dir,
            "Notes,Expected Groups,Query\nfirst,1,q1\nsecond,2,q2\n",
        );
        let loaded = table::load(&path).unwrap();
        assert_eq!(loaded.rows[1].query, "q2");
        assert_eq!(loaded.rows[1].expected_groups, "2");
    }

    #[test]
    fn test_short_record_reads_empty_expected() {
        let dir = TempDir::new().unwrap();
        let path = write_input(&dir, "Query,Expected Groups\nlonely query\n");
        let loaded = table::load(&path).unwrap();
        assert_eq!(loaded.rows[0].query, "lonely query");
        assert_eq!(loaded.rows[0].expected_groups, "");
    }

    #[test]
    fn test_missing_column() {
        let dir = TempDir::new().unwrap();
        let path = write_input(&dir, "Query,Groups\nq,1\n");
        match table::load(&path) {
            Err(TableError::MissingColumn(name)) => assert_eq!(name, columns::EXPECTED_GROUPS),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn test_header_only_is_empty_table() {
        let dir = TempDir::new().unwrap();
        let path = write_input(&dir, "Query,Expected Groups\n");
        let loaded = table::load(&path).unwrap();
        assert!(loaded.is_empty());
    }
}

mod save_tests {
    use super::*;

    #[test]
    fn test_appends_verdict_column() {
        let dir = TempDir::new().unwrap();
        let input = write_input(
            &dir,
            "Query,Expected Groups,Notes\na,1,x\nb,\"2, 3\",y\nc,,z\n",
        );
        let mut loaded = table::load(&input).unwrap();
        loaded.rows[0].verdict = Some(Verdict::Matched);
        loaded.rows[1].verdict = Some(Verdict::NotMatched);
        loaded.rows[2].verdict = Some(Verdict::Error);

        let output = dir.path().join("results.csv");
        table::save(&loaded, &output).unwrap();

        assert_eq!(
            read_rows(&output),
            vec![
                vec!["Query", "Expected Groups", "Notes", "Google Search Validation"],
                vec!["a", "1", "x", "matched"],
                vec!["b", "2, 3", "y", "not_matched"],
                vec!["c", "", "z", "error"],
            ]
        );
    }

    #[test]
    fn test_existing_verdict_column_is_overwritten() {
        let dir = TempDir::new().unwrap();
        let input = write_input(
            &dir,
            "Query,Google Search Validation,Expected Groups\na,error,1\n",
        );
        let mut loaded = table::load(&input).unwrap();
        loaded.rows[0].verdict = Some(Verdict::Matched);

        let output = dir.path().join("results.csv");
        table::save(&loaded, &output).unwrap();

        assert_eq!(
            read_rows(&output),
            vec![
                vec!["Query", "Google Search Validation", "Expected Groups"],
                vec!["a", "matched", "1"],
            ]
        );
    }

    #[test]
    fn test_overwrites_output_and_pads_short_rows() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "Query,Expected Groups\nonly query\n");
        let output = dir.path().join("results.csv");
        fs::write(&output, "stale contents that must go away\n").unwrap();

        let loaded = table::load(&input).unwrap();
        table::save(&loaded, &output).unwrap();

        assert_eq!(
            read_rows(&output),
            vec![
                vec!["Query", "Expected Groups", "Google Search Validation"],
                vec!["only query", "", ""],
            ]
        );
    }

    #[test]
    fn test_quoted_query_survives_round_trip() {
        let dir = TempDir::new().unwrap();
        let input = write_input(
            &dir,
            "Query,Expected Groups\n\"\"\"Top Trader Jobe Goods\"\"\",\"2324243,425343141\"\n",
        );
        let loaded = table::load(&input).unwrap();
        let output = dir.path().join("results.csv");
        table::save(&loaded, &output).unwrap();

        let reloaded = table::load(&output).unwrap();
        assert_eq!(reloaded.rows[0].query, "\"Top Trader Jobe Goods\"");
        assert_eq!(reloaded.rows[0].expected_groups, "2324243,425343141");
    }
}

mod template_tests {
    use super::*;

    #[test]
    fn test_template_is_a_loadable_example() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("queries.csv");
        table::write_template(&path).unwrap();

        let loaded = table::load(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.rows[0].query, table::TEMPLATE_QUERY);
        assert_eq!(loaded.rows[0].expected_groups, "2324243,425343141");
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("Query,Expected Groups"));
        assert!(raw.contains("\"\"\"Top Trader Jobe Goods\"\"\""));
    }
}
