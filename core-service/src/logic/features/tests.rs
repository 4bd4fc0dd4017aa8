//! Property tests for the Schema Aligner
//!
//! Kiểm tra các tính chất của align() trên nhiều record khác nhau.

#[cfg(test)]
mod property_tests {
    use crate::logic::features::{align, FeatureRecord, FeatureSchema};
    use serde_json::json;

    fn flow_schema() -> FeatureSchema {
        FeatureSchema::new([
            "Flow Duration",
            "Total Fwd Packets",
            "Total Backward Packets",
            "Flow Bytes/s",
            "Flow Packets/s",
            "SYN Flag Count",
        ])
        .unwrap()
    }

    fn sample_records() -> Vec<FeatureRecord> {
        vec![
            FeatureRecord::new(),
            FeatureRecord::new().with("Flow Duration", 1.5),
            FeatureRecord::new()
                .with("Flow Duration", 3_000_000)
                .with("Total Fwd Packets", 12)
                .with("Total Backward Packets", 9)
                .with("Flow Bytes/s", 8123.25)
                .with("Flow Packets/s", 7.0)
                .with("SYN Flag Count", 1),
            FeatureRecord::new().with("SYN Flag Count", 0).with("Flow Packets/s", -2.0),
        ]
    }

    /// Aligning twice yields the same vector
    #[test]
    fn test_align_is_idempotent() {
        let schema = flow_schema();
        for record in sample_records() {
            let first = align(&record, &schema).unwrap();
            let second = align(&record, &schema).unwrap();
            assert_eq!(first, second);
        }
    }

    /// Missing positions are exactly 0.0, present fields keep their values in schema order
    #[test]
    fn test_missing_positions_are_zero() {
        let schema = flow_schema();
        for record in sample_records() {
            let vector = align(&record, &schema).unwrap();
            assert_eq!(vector.len(), schema.len());

            for (i, name) in schema.iter().enumerate() {
                let expected = record
                    .get(name)
                    .and_then(|v| v.as_f64())
                    .map(|v| v as f32)
                    .unwrap_or(0.0);
                assert_eq!(vector.get(i), Some(expected), "position {} ({})", i, name);
            }
        }
    }

    /// Extra keys never change the output
    #[test]
    fn test_unknown_fields_do_not_affect_output() {
        let schema = flow_schema();
        for record in sample_records() {
            let baseline = align(&record, &schema).unwrap();

            let mut noisy = record.clone();
            noisy.insert("Label", "BENIGN");
            noisy.insert("Source IP", "10.0.0.1");
            noisy.insert("Timestamp", json!({"ts": 1}));
            noisy.insert("flow duration", 999.0); // case differs, still unknown

            assert_eq!(align(&noisy, &schema).unwrap(), baseline);
        }
    }

    #[test]
    fn test_vector_lookup_by_name() {
        let schema = flow_schema();
        let record = FeatureRecord::new().with("Flow Bytes/s", 42.0);
        let vector = align(&record, &schema).unwrap();

        assert_eq!(vector.get_by_name(&schema, "Flow Bytes/s"), Some(42.0));
        assert_eq!(vector.get_by_name(&schema, "Flow Duration"), Some(0.0));
        assert_eq!(vector.get_by_name(&schema, "Label"), None);
    }

    #[test]
    fn test_vector_does_not_match_other_schema() {
        let schema = flow_schema();
        let other = FeatureSchema::new(["Flow Duration"]).unwrap();
        let vector = align(&FeatureRecord::new(), &schema).unwrap();

        assert!(vector.matches(&schema));
        assert!(!vector.matches(&other));
    }
}
