use cardkit_core::{
    AdaptiveCard, CardBuilder, CardError, ColumnWidth, DataConnector, Element, ElementFactory,
    FormField, LayoutHelper, NotificationLevel, TargetPlatform, TemplateFactory, TextBlock,
    TextOptions, ValidationUtility,
};
use serde_json::json;

#[test]
fn warning_notification_validates_cleanly() {
    let card =
        TemplateFactory::create_notification_card("T", "M", NotificationLevel::Warning, None, None)
            .unwrap();
    let validator = ValidationUtility::new(TargetPlatform::Teams);
    let result = validator.validate(&card).unwrap();
    assert!(result.valid, "{:?}", result.details);
    assert!(result.details.is_empty());
    assert!(result.size < result.size_limit);
    assert_eq!(result.size_limit, 28.0);
}

#[test]
fn unsupported_form_field_fails_before_a_card_exists() {
    let fields = vec![FormField::new("unsupported", "x", "X")];
    let err = TemplateFactory::create_form_card("Survey", None, &fields, "Submit").unwrap_err();
    assert!(err.is_invalid_argument());
    assert!(err.to_string().contains("unsupported form field type"));
}

#[test]
fn oversized_card_is_invalid_for_teams_but_fits_generic() {
    let mut card = AdaptiveCard::default();
    card.push(TextBlock::new("x".repeat(30 * 1024)));

    let teams = ValidationUtility::new(TargetPlatform::Teams).validate(&card).unwrap();
    assert!(!teams.valid);
    assert!(teams.details.iter().any(|d| d.contains("exceeds the teams limit")));

    let generic = ValidationUtility::new(TargetPlatform::Generic).validate(&card).unwrap();
    assert!(generic.details.iter().all(|d| !d.contains("exceeds")));
}

#[test]
fn images_need_url_and_alt_text() {
    for (url, alt) in [("", "x"), ("u", ""), ("   ", "x")] {
        let err = ElementFactory::create_image(url, alt, None, None).unwrap_err();
        assert!(matches!(err, CardError::InvalidArgument(_)), "{url:?}/{alt:?}");
    }
}

#[test]
fn text_blocks_survive_json_round_trip() {
    let block = ElementFactory::create_text("x", TextOptions::default()).unwrap();
    let value = serde_json::to_value(&block).unwrap();
    assert_eq!(value["type"], "TextBlock");
    let back: TextBlock = serde_json::from_value(value).unwrap();
    assert_eq!(back, block);
}

#[test]
fn heading_levels_never_fail() {
    for level in [-5, 0, 1, 2, 3, 4, 99] {
        assert!(ElementFactory::create_heading("Title", level).is_ok(), "level {level}");
    }
    assert_eq!(
        ElementFactory::create_heading("a", 0).unwrap(),
        ElementFactory::create_heading("a", 1).unwrap()
    );
    assert_eq!(
        ElementFactory::create_heading("a", 7).unwrap(),
        ElementFactory::create_heading("a", 3).unwrap()
    );
}

#[test]
fn equal_columns_share_one_width() {
    for count in 1..=5 {
        let groups = (0..count)
            .map(|i| vec![TextBlock::new(format!("col {i}")).into()])
            .collect();
        let set = LayoutHelper::create_equal_columns(groups).unwrap();
        assert_eq!(set.columns.len(), count);
        let widths: Vec<_> = set
            .columns
            .iter()
            .map(|column| column.as_column().and_then(|c| c.width))
            .collect();
        assert!(widths.iter().all(|w| *w == Some(ColumnWidth::Weight(1))));
    }
}

#[test]
fn tables_have_a_row_per_record_plus_header() {
    let headers = ["Name", "Role"];
    for rows in [
        vec![],
        vec![vec!["Ada", "Engineer"]],
        vec![vec!["Ada", "Engineer"], vec!["Grace", "Admiral"], vec!["Linus", "Maintainer"]],
    ] {
        let table = DataConnector::create_table(&headers, &rows, None, true).unwrap();
        assert_eq!(table.len(), rows.len() + 1);
        assert!(table.iter().all(|row| row.type_name() == "ColumnSet"));
    }

    let ragged = vec![vec!["Ada", "Engineer"], vec!["Grace"]];
    let err = DataConnector::create_table(&headers, &ragged, None, false).unwrap_err();
    assert!(err.is_invalid_argument());
}

#[test]
fn validation_is_repeatable() {
    let card = TemplateFactory::create_dashboard_card(
        "Ops",
        [("Uptime", "99.9%"), ("Incidents", "0")],
        Some("Weekly numbers"),
        Some("https://charts.example.com/ops.png"),
    )
    .unwrap();
    let validator = ValidationUtility::default();
    let first = validator.validate(&card).unwrap();
    let second = validator.validate(&card).unwrap();
    assert_eq!(first, second);
}

#[test]
fn appending_elements_never_shrinks_the_card() {
    let validator = ValidationUtility::default();
    let mut card = CardBuilder::new()
        .add_item(TextBlock::new("start"))
        .build()
        .unwrap();
    let mut previous = validator.get_size(&card).unwrap();
    let additions: Vec<Element> = vec![
        ElementFactory::create_text("more", TextOptions::default()).unwrap().into(),
        ElementFactory::create_image("https://img.example.com/a.png", "a", None, None)
            .unwrap()
            .into(),
        DataConnector::create_fact_set([("k", "v")]).into(),
        serde_json::from_value(json!({"type": "RichTextBlock", "inlines": ["x"]})).unwrap(),
    ];
    for element in additions {
        card.push(element);
        let size = validator.get_size(&card).unwrap();
        assert!(size >= previous, "{size} < {previous}");
        previous = size;
    }
}

#[test]
fn json_data_card_validates() {
    let elements = DataConnector::from_json(&json!({
        "service": "billing",
        "healthy": true,
        "regions": ["eu", "us"],
    }))
    .unwrap();
    let card = CardBuilder::new().add_items(elements).build().unwrap();
    let result = ValidationUtility::new(TargetPlatform::Generic)
        .validate(&card)
        .unwrap();
    assert!(result.valid, "{:?}", result.details);
}
