use cashflow_core::currency::{
    format_currency, format_currency_value, parse_currency, CurrencyCode, CurrencyDisplay,
    FormatOptions, LocaleConfig, NegativeStyle,
};

#[test]
fn formats_currency_with_locale() {
    let locale = LocaleConfig {
        decimal_separator: ',',
        grouping_separator: ' ',
        ..LocaleConfig::default()
    };
    let options = FormatOptions {
        currency_display: CurrencyDisplay::Symbol,
        negative_style: NegativeStyle::Parentheses,
    };
    let formatted = format_currency_value(-1234.5, &CurrencyCode::new("EUR"), &locale, &options);
    assert_eq!(formatted, "(€1 234,50)");
}

#[test]
fn rupiah_round_trips_through_display_text() {
    for value in [0, 950, 50_000, 12_345_678] {
        assert_eq!(parse_currency(&format_currency(value)), value);
    }
    assert_eq!(format_currency(12_345_678), "Rp12.345.678");
}
