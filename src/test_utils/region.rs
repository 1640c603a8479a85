use scraper::{ElementRef, Html, Selector};

#[track_caller]
pub(crate) fn must_get_element<'a>(html: &'a Html, selector: &str) -> ElementRef<'a> {
    html.select(&Selector::parse(selector).unwrap())
        .next()
        .unwrap_or_else(|| panic!("No element found for {selector}"))
}

#[track_caller]
pub(crate) fn assert_hx_attribute(element: &ElementRef<'_>, attribute: &str, want: &str) {
    let got = element
        .value()
        .attr(attribute)
        .unwrap_or_else(|| panic!("{attribute} attribute missing"));

    assert_eq!(
        got, want,
        "want element with attribute {attribute}=\"{want}\", got {got:?}"
    );
}

/// Assert that `html` holds exactly one alert, with the given heading and details.
#[track_caller]
pub(crate) fn assert_alert(html: &Html, want_heading: &str, want_details: &str) {
    let alert_selector = Selector::parse("div.alert[role=alert]").unwrap();
    let alerts: Vec<ElementRef> = html.select(&alert_selector).collect();
    assert_eq!(alerts.len(), 1, "want exactly one alert, got {}", alerts.len());

    let heading = alerts[0]
        .select(&Selector::parse("p.font-semibold").unwrap())
        .next()
        .expect("alert heading missing")
        .text()
        .collect::<String>();
    assert_eq!(heading.trim(), want_heading);

    let details = alerts[0]
        .select(&Selector::parse("p.alert-details").unwrap())
        .next()
        .expect("alert details missing")
        .text()
        .collect::<String>();
    assert_eq!(details.trim(), want_details);
}
