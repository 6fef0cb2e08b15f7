use chrono::NaiveDate;
use whisker::{Engine, Value, WhiskerError};

fn engine() -> Engine {
    Engine::builder().default_locale("en_US").build().unwrap()
}

fn model() -> Value {
    Value::map([
        ("when", Value::from(NaiveDate::from_ymd_opt(2012, 6, 19).unwrap())),
        ("text", Value::from("not a date")),
    ])
}

fn render(source: &str) -> whisker::Result<String> {
    engine().render(source, &model())
}

#[test]
fn test_default_style_is_medium() {
    assert_eq!(render("{{dateFormat when}}").unwrap(), "Jun 19, 2012");
}

#[test]
fn test_named_styles() {
    assert_eq!(
        render("{{dateFormat when \"full\"}}").unwrap(),
        "Tuesday, June 19, 2012"
    );
    assert_eq!(render("{{dateFormat when \"long\"}}").unwrap(), "June 19, 2012");
    assert_eq!(render("{{dateFormat when \"short\"}}").unwrap(), "6/19/12");
}

#[test]
fn test_explicit_pattern() {
    assert_eq!(render("{{dateFormat when \"yyyy\"}}").unwrap(), "2012");
    assert_eq!(
        render("{{dateFormat when \"dd.MM.yyyy\"}}").unwrap(),
        "19.06.2012"
    );
}

#[test]
fn test_explicit_locale() {
    assert!(render("{{dateFormat when \"full\" \"es_ES\"}}")
        .unwrap()
        .contains("martes"));
    assert_eq!(render("{{dateFormat when \"MMMM\" \"fr\"}}").unwrap(), "juin");
}

#[test]
fn test_styles_in_other_languages() {
    assert_eq!(
        render("{{dateFormat when \"medium\" \"fr_FR\"}}").unwrap(),
        "19 juin 2012"
    );
    assert_eq!(
        render("{{dateFormat when \"long\" \"de_DE\"}}").unwrap(),
        "19. Juni 2012"
    );
    assert_eq!(
        render("{{dateFormat when \"full\" \"es_ES\"}}").unwrap(),
        "martes 19 de junio de 2012"
    );
    assert_eq!(
        render("{{dateFormat when \"short\" \"fr_FR\"}}").unwrap(),
        "19/06/12"
    );
}

#[test]
fn test_engine_default_locale() {
    let engine = Engine::builder().default_locale("de_DE").build().unwrap();
    assert_eq!(
        engine
            .render("{{dateFormat when \"EEEE\"}}", &model())
            .unwrap(),
        "Dienstag"
    );
}

#[test]
fn test_malformed_locale() {
    let err = render("{{dateFormat when \"medium\" \"en-US\"}}").unwrap_err();
    assert!(matches!(err, WhiskerError::ArgumentType { .. }));
}

#[test]
fn test_malformed_pattern() {
    let err = render("{{dateFormat when \"yyyy q\"}}").unwrap_err();
    assert!(matches!(err, WhiskerError::ArgumentType { .. }));
}

#[test]
fn test_non_date_renders_nothing() {
    assert_eq!(render("[{{dateFormat text}}{{dateFormat missing}}]").unwrap(), "[]");
}
