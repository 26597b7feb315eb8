//! End-to-end flow: loader-shaped JSON rows through cleaning, derivation and
//! every reduction.

#[cfg(test)]
mod tests {
    use campaign_core::types::RawCampaignRow;
    use campaign_core::{CampaignError, Field};
    use campaign_reporting::{DashboardBuilder, GroupBy, Metric, MetricsEngine};

    /// Rows as a spreadsheet export would hand them over: mixed numbers and
    /// text, blank cells, one junk value.
    fn sample_rows() -> Vec<RawCampaignRow> {
        serde_json::from_str(
            r##"[
                {"Marketing_Channel": "A", "Impressions": 1000, "Clicks": 100, "Conversions": 10,
                 "Total_Spend": 50, "Revenue_Generated": 200, "End_Date": "2024-03-02"},
                {"Marketing_Channel": "B", "Impressions": "4000", "Clicks": "200", "Conversions": 0,
                 "Total_Spend": "80.0", "Revenue_Generated": 0, "End_Date": "2024-02-11"},
                {"Marketing_Channel": "A", "Impressions": 500, "Clicks": 50, "Conversions": 5,
                 "Total_Spend": 25, "Revenue_Generated": 100, "End_Date": "2024-03-30"},
                {"Marketing_Channel": "", "Impressions": 300, "Clicks": "#N/A", "Conversions": null,
                 "Total_Spend": 5, "Revenue_Generated": 1, "End_Date": "soon"}
            ]"##,
        )
        .unwrap()
    }

    #[test]
    fn test_channel_table() {
        let engine = MetricsEngine::default();
        let records = engine.prepare(&sample_rows()).unwrap();
        let rows = engine.aggregate_by(&records, GroupBy::Channel);

        let keys: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, ["A", "B"]);

        assert_eq!(rows[0].get(Metric::Clicks), Some(150.0));
        assert_eq!(rows[0].get(Metric::Conversions), Some(15.0));
        assert_eq!(rows[0].get(Metric::ConversionRate), Some(10.0));
        assert_eq!(rows[1].get(Metric::Cpa), None);
        assert_eq!(rows[1].get(Metric::Roas), Some(0.0));
        assert_eq!(rows[1].get(Metric::Ctr), Some(5.0));
    }

    #[test]
    fn test_kpis_include_unkeyed_rows() {
        let engine = MetricsEngine::default();
        let records = engine.prepare(&sample_rows()).unwrap();
        let kpis = engine.summarize(&records);

        // The blank-channel row is out of the channel table but still in the totals.
        assert_eq!(kpis.record_count, 4);
        assert_eq!(kpis.total_impressions, 5800);
        assert_eq!(kpis.total_clicks, 350);
        assert_eq!(kpis.total_conversions, 15);
        assert_eq!(kpis.total_spend, 160.0);
        assert_eq!(kpis.total_revenue, 301.0);
    }

    #[test]
    fn test_channel_means_differ_from_kpi_ratios() {
        let engine = MetricsEngine::default();
        let records = engine.prepare(&sample_rows()).unwrap();
        let kpis = engine.summarize(&records);
        let channels = engine.aggregate_by(&records, GroupBy::Channel);

        let mean_of_channel_roas: f64 =
            channels.iter().filter_map(|r| r.get(Metric::Roas)).sum::<f64>() / channels.len() as f64;
        assert_ne!(Some(mean_of_channel_roas), kpis.overall_roas);
        assert_ne!(channels[0].get(Metric::ConversionRate), kpis.overall_conversion_rate);
    }

    #[test]
    fn test_month_table() {
        let engine = MetricsEngine::default();
        let records = engine.prepare(&sample_rows()).unwrap();
        let months = engine.aggregate_by(&records, GroupBy::Month);

        let keys: Vec<&str> = months.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, ["2024-02", "2024-03"]);
        assert_eq!(months[1].get(Metric::Impressions), Some(1500.0));
        assert_eq!(months[1].get(Metric::RevenueGenerated), Some(300.0));
    }

    #[test]
    fn test_dashboard_report_serializes() {
        let engine = MetricsEngine::default();
        let report = DashboardBuilder::new(&engine).build(&sample_rows()).unwrap();

        assert_eq!(report.issue_count, 2);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["channels"][0]["key"], "A");
        assert_eq!(json["channels"][1]["values"]["cpa"], serde_json::Value::Null);
        assert_eq!(json["months"][0]["key"], "2024-02");
        assert_eq!(json["roas_matrix"]["months"][1], "2024-03");
        assert_eq!(json["kpis"]["total_clicks"], 350);
        assert_eq!(json["spend_revenue"].as_array().unwrap().len(), 4);
        assert_eq!(json["spend_revenue"][3]["channel"], serde_json::Value::Null);
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let rows: Vec<RawCampaignRow> = serde_json::from_str(
            r#"[{"Marketing_Channel": "A", "Impressions": 1, "Clicks": 1, "Conversions": 1,
                 "Total_Spend": 1, "Revenue_Generated": 1}]"#,
        )
        .unwrap();
        let engine = MetricsEngine::default();

        let err = engine.prepare(&rows).unwrap_err();
        assert!(matches!(err, CampaignError::SchemaViolation { field: Field::EndDate }));
        assert!(DashboardBuilder::new(&engine).build(&rows).is_err());
    }

    #[test]
    fn test_empty_input_is_degenerate_not_fatal() {
        let engine = MetricsEngine::default();
        let report = DashboardBuilder::new(&engine).build(&[]).unwrap();

        let kpis = report.kpis.unwrap();
        assert_eq!(kpis.total_clicks, 0);
        assert_eq!(kpis.total_spend, 0.0);
        assert_eq!(kpis.average_ctr, None);
        assert_eq!(kpis.overall_roas, None);
        assert!(report.channels.unwrap().is_empty());
        assert!(report.months.unwrap().is_empty());
        assert!(report.impressions_histogram.unwrap().bins.is_empty());
    }
}
