//! Integration tests for RfmForge

use std::io::Write;

use chrono::NaiveDate;
use rfmforge::{
    load_records_from_path, run_analysis, AnalysisConfig, Campaign, RfmError, Segment,
};
use tempfile::NamedTempFile;

const HEADER: &str = "master_id,order_channel,last_order_channel,first_order_date,last_order_date,last_order_date_online,last_order_date_offline,order_num_total_ever_online,order_num_total_ever_offline,customer_value_total_ever_offline,customer_value_total_ever_online,interested_in_categories_12";

/// Create a test CSV file with ten customers of varying activity
fn create_test_csv() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{HEADER}").unwrap();

    // Frequent, recent, high spenders
    writeln!(file, "c01,Android App,Offline,2019-01-10,2021-05-31,2021-05-31,2021-04-01,9.0,3.0,400.00,900.00,\"[KADIN, AKTIFSPOR]\"").unwrap();
    writeln!(file, "c02,Desktop,Desktop,2019-03-02,2021-05-29,2021-05-29,2020-12-01,8.0,2.0,100.00,700.00,[ERKEK]").unwrap();
    writeln!(file, "c03,Mobile,Mobile,2020-01-15,2021-05-20,2021-05-20,2020-07-07,5.0,1.0,50.00,150.00,[KADIN]").unwrap();
    writeln!(file, "c04,Ios App,Ios App,2020-06-01,2021-05-10,2021-05-10,2020-06-01,4.0,1.0,20.00,120.00,[COCUK]").unwrap();

    // Middle of the pack
    writeln!(file, "c05,Mobile,Offline,2020-02-02,2021-03-01,2021-01-01,2021-03-01,2.0,2.0,80.00,70.00,\"[KADIN, ERKEK]\"").unwrap();
    writeln!(file, "c06,Offline,Offline,2020-08-08,2021-02-01,2020-08-08,2021-02-01,1.0,2.0,90.00,10.00,[AKTIFCOCUK]").unwrap();

    // Lapsed customers
    writeln!(file, "c07,Desktop,Desktop,2018-05-05,2020-10-01,2020-10-01,2019-01-01,1.0,1.0,30.00,40.00,[ERKEK]").unwrap();
    writeln!(file, "c08,Mobile,Mobile,2018-01-01,2020-08-15,2020-08-15,2018-01-01,1.0,0.0,0.00,60.00,[KADIN]").unwrap();
    writeln!(file, "c09,Android App,Android App,2017-11-11,2020-06-01,2020-06-01,2017-11-11,1.0,0.0,0.00,35.00,[COCUK]").unwrap();
    writeln!(file, "c10,Offline,Offline,2017-01-01,2020-05-05,2017-01-01,2020-05-05,0.0,1.0,25.00,0.00,[ERKEK]").unwrap();

    file
}

fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 6, 1).unwrap()
}

#[test]
fn test_end_to_end_pipeline() {
    let test_file = create_test_csv();
    let records = load_records_from_path(test_file.path()).unwrap();
    assert_eq!(records.len(), 10);

    let analysis = run_analysis(&records, &AnalysisConfig::default()).unwrap();
    assert_eq!(analysis.customers.len(), 10);

    let c01 = &analysis.customers[0];
    assert_eq!(c01.metrics.recency, 1);
    assert_eq!(c01.metrics.frequency, 12);
    assert_eq!(c01.metrics.monetary, 1300.0);
    assert_eq!(c01.rfm_code().to_string(), "55");
    assert_eq!(c01.segment, Segment::Champions);

    let c10 = &analysis.customers[9];
    assert_eq!(c10.scores.recency.get(), 1);
    assert_eq!(c10.segment, Segment::Hibernating);

    // Every customer is counted in exactly one segment.
    let counted: usize = analysis.summary.iter().map(|row| row.count).sum();
    assert_eq!(counted, 10);
}

#[test]
fn test_campaign_targets() {
    let test_file = create_test_csv();
    let records = load_records_from_path(test_file.path()).unwrap();
    let analysis = run_analysis(&records, &AnalysisConfig::default()).unwrap();

    let new_brand = &analysis.targets[0];
    assert_eq!(new_brand.campaign, "new_brand");
    assert_eq!(new_brand.customer_ids, vec!["c01".to_string()]);

    let discount = &analysis.targets[1];
    assert_eq!(discount.campaign, "discount");
    for id in &discount.customer_ids {
        let customer = analysis
            .customers
            .iter()
            .find(|c| &c.metrics.customer_id == id)
            .unwrap();
        assert!(matches!(
            customer.segment,
            Segment::AtRisk | Segment::Hibernating | Segment::CantLoose | Segment::NewCustomers
        ));
        let categories = &customer.metrics.categories;
        assert!(categories.contains("ERKEK") || categories.contains("COCUK"));
    }
    assert!(discount.customer_ids.contains(&"c10".to_string()));
    assert!(!discount.customer_ids.contains(&"c08".to_string()));
}

#[test]
fn test_reference_date_before_data_is_rejected() {
    let test_file = create_test_csv();
    let records = load_records_from_path(test_file.path()).unwrap();
    let config = AnalysisConfig::new(
        NaiveDate::from_ymd_opt(2021, 5, 1).unwrap(),
        vec![Campaign::new_brand()],
    );

    let err = run_analysis(&records, &config).unwrap_err();
    assert!(matches!(err, RfmError::ReferenceDateTooEarly { .. }));
}

#[test]
fn test_invalid_row_fails_load() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{HEADER}").unwrap();
    writeln!(file, "ok,Mobile,Mobile,2020-01-01,2021-01-01,2021-01-01,2021-01-01,1.0,0.0,0.0,10.0,[KADIN]").unwrap();
    writeln!(file, "bad,Mobile,Mobile,2020-01-01,2021-01-01,2021-01-01,2021-01-01,x,0.0,0.0,10.0,[KADIN]").unwrap();

    let err = load_records_from_path(file.path()).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("bad"), "{message}");
    assert!(message.contains("order_num_total_ever_online"), "{message}");
}

#[test]
fn test_repeated_runs_are_identical() {
    let test_file = create_test_csv();
    let records = load_records_from_path(test_file.path()).unwrap();
    let config = AnalysisConfig::new(reference_date(), vec![Campaign::new_brand(), Campaign::discount()]);

    let first = run_analysis(&records, &config).unwrap();
    let second = run_analysis(&records, &config).unwrap();
    assert_eq!(first.customers, second.customers);
    assert_eq!(first.targets, second.targets);
}
