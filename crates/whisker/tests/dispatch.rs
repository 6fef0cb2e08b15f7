use std::sync::atomic::{AtomicUsize, Ordering};

use whisker::{
    Context, Engine, HelperResult, Lambda, Object, Options, Output, Resolved, Value, WhiskerError,
};

fn render(source: &str, model: &Value) -> String {
    Engine::new().render(source, model).unwrap()
}

#[derive(Debug)]
struct ListAndLambda;

impl Object for ListAndLambda {
    fn elements(&self) -> Option<Vec<Value>> {
        Some(vec![Value::from("a"), Value::from("b")])
    }

    fn as_lambda(&self) -> Option<&dyn Lambda> {
        Some(self)
    }
}

impl Lambda for ListAndLambda {
    fn apply(&self, _scope: &Context<'_>, _body: &str) -> whisker::Result<Value> {
        Ok(Value::from("lambda"))
    }
}

#[test]
fn test_iterable_wins_over_lambda() {
    let model = Value::map([("x", Value::object(ListAndLambda))]);
    assert_eq!(render("{{#x}}[{{.}}]{{/x}}", &model), "[a][b]");
}

#[test]
fn test_boolean_section() {
    let source = "{{#flag}}yes{{else}}no{{/flag}}";
    assert_eq!(render(source, &Value::map([("flag", true)])), "yes");
    assert_eq!(render(source, &Value::map([("flag", false)])), "no");
}

#[test]
fn test_object_section_shifts_scope() {
    let model = Value::map([
        ("company", Value::from("Acme")),
        ("user", Value::map([("name", "Ada")])),
    ]);
    assert_eq!(
        render("{{#user}}{{name}} of {{company}} / {{../company}}{{/user}}", &model),
        "Ada of Acme / Acme"
    );
}

#[test]
fn test_with_renders_falsy_values() {
    let model = Value::map([
        ("n", Value::from(0)),
        ("s", Value::from("")),
        ("m", Value::map(Vec::<(String, Value)>::new())),
    ]);
    let source = "[{{#with n}}n={{this}}{{/with}}][{{#with s}}s{{/with}}][{{#with m}}m{{/with}}][{{#n}}implicit={{.}}{{/n}}]";
    assert_eq!(render(source, &model), "[n=0][s][m][implicit=0]");
}

#[test]
fn test_absent_section_renders_body() {
    assert_eq!(
        render("[{{#missing}}x{{.}}{{else}}none{{/missing}}]", &Value::Null),
        "[x]"
    );
    assert_eq!(render("[{{^missing}}none{{/missing}}]", &Value::Null), "[none]");
}

#[test]
fn test_inverted_section() {
    let source = "{{^items}}none{{/items}}";
    assert_eq!(render(source, &Value::map([("items", Vec::<i32>::new())])), "none");
    assert_eq!(render(source, &Value::map([("items", vec![1])])), "");
    assert_eq!(render(source, &Value::Null), "none");
}

#[test]
fn test_each_order_and_locals() {
    let model = Value::map([("items", vec!["a", "b", "c"])]);
    let source = "{{#each items}}{{@index}}:{{.}}{{#if @first}}(first){{/if}}{{#if @last}}(last){{/if}} {{/each}}";
    assert_eq!(render(source, &model), "0:a(first) 1:b 2:c(last) ");
}

#[test]
fn test_each_empty_renders_inverse() {
    let model = Value::map([("items", Vec::<String>::new())]);
    assert_eq!(
        render("{{#each items}}x{{else}}empty{{/each}}", &model),
        "empty"
    );
}

#[test]
fn test_each_over_single_value() {
    let model = Value::map([("user", Value::map([("name", "Ada")]))]);
    assert_eq!(render("{{#each user}}{{name}}{{/each}}", &model), "Ada");
}

/// Reports one element the first time it is asked, none afterwards.
#[derive(Debug, Default)]
struct Draining(AtomicUsize);

impl Object for Draining {
    fn elements(&self) -> Option<Vec<Value>> {
        match self.0.fetch_add(1, Ordering::SeqCst) {
            0 => Some(vec![Value::from("once")]),
            _ => Some(Vec::new()),
        }
    }
}

#[test]
fn test_each_tolerates_shrinking_elements() {
    let model = Value::map([("items", Value::object(Draining::default()))]);
    assert_eq!(render("[{{#each items}}{{.}}{{/each}}]", &model), "[]");
}

#[test]
fn test_if_unless_treat_zero_and_empty_string_as_falsy() {
    assert_eq!(
        render("{{#if n}}y{{else}}n{{/if}}", &Value::map([("n", 0)])),
        "n"
    );
    assert_eq!(
        render("{{#unless s}}empty{{/unless}}", &Value::map([("s", "")])),
        "empty"
    );
    assert_eq!(
        render("{{#if s}}y{{else}}n{{/if}}", &Value::map([("s", "0")])),
        "y"
    );
}

#[test]
fn test_escaping() {
    let model = Value::map([("v", "<a href='x'>")]);
    assert_eq!(
        render("{{v}}|{{{v}}}|{{&v}}", &model),
        "&lt;a href&#x3D;&#x27;x&#x27;&gt;|<a href='x'>|<a href='x'>"
    );
}

#[test]
fn test_null_and_absent_variables_render_nothing() {
    let model = Value::map([("n", Value::Null)]);
    assert_eq!(render("[{{n}}{{missing}}{{missing.deep}}]", &model), "[]");
}

#[test]
fn test_paths() {
    let model = Value::map([
        ("user", Value::map([("name", "Ada")])),
        ("items", Value::from(vec!["x", "y"])),
    ]);
    assert_eq!(
        render("{{user.name}} {{items.length}} {{items.1}} {{this.user.name}}", &model),
        "Ada 2 y Ada"
    );
}

#[test]
fn test_comment_renders_nothing() {
    assert_eq!(render("a{{! hidden }}b", &Value::Null), "ab");
}

#[test]
fn test_lambda_section() {
    let model = Value::map([
        ("name", Value::from("Ada")),
        ("wrap", Value::lambda(|body| format!("<em>{}</em>", body))),
    ]);
    assert_eq!(render("{{#wrap}}{{name}}{{/wrap}}", &model), "<em>Ada</em>");
}

#[test]
fn test_lambda_runs_every_time() {
    use std::sync::Arc;

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let model = Value::map([(
        "count",
        Value::lambda0(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            "x".to_string()
        }),
    )]);
    let template = Engine::new().compile("{{#count}}{{/count}}{{#count}}{{/count}}").unwrap();
    assert_eq!(template.render(&model).unwrap(), "xx");
    assert_eq!(template.render(&model).unwrap(), "xx");
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[test]
fn test_lambda_variable() {
    let model = Value::map([
        ("name", Value::from("Ada")),
        ("greet", Value::lambda0(|| "Hello {{name}}".to_string())),
    ]);
    assert_eq!(render("{{greet}}!", &model), "Hello Ada!");
}

#[test]
fn test_lambda_uses_section_delimiters() {
    let model = Value::map([
        ("name", Value::from("Ada")),
        ("shout", Value::lambda0(|| "<%name%>!".to_string())),
    ]);
    assert_eq!(
        render("{{=<% %>=}}<%#shout%>ignored<%/shout%>", &model),
        "Ada!"
    );
}

#[test]
fn test_lambda_body_keeps_section_delimiters() {
    let model = Value::map([
        ("name", Value::from("Ada")),
        ("wrap", Value::lambda(|body| format!("<em>{}</em>", body))),
    ]);
    assert_eq!(
        render("{{=<% %>=}}<%#wrap%><%name%><%/wrap%>", &model),
        "<em>Ada</em>"
    );
}

#[test]
fn test_custom_resolver_runs_first() {
    let engine = Engine::builder()
        .resolver(|_: &Value, name: &str| match name {
            "title" => Resolved::Value(Value::from("custom")),
            _ => Resolved::Unresolved,
        })
        .build()
        .unwrap();
    let model = Value::map([("title", "model"), ("other", "kept")]);
    assert_eq!(engine.render("{{title}} {{other}}", &model).unwrap(), "custom kept");
}

#[test]
fn test_resolved_null_stops_the_chain() {
    let engine = Engine::builder()
        .resolver(|_: &Value, name: &str| match name {
            "secret" => Resolved::Value(Value::Null),
            _ => Resolved::Unresolved,
        })
        .build()
        .unwrap();
    let model = Value::map([("secret", "leaked")]);
    assert_eq!(engine.render("[{{secret}}]", &model).unwrap(), "[]");

    let model = Value::map([
        ("title", Value::from("Home")),
        ("child", Value::map([("title", Value::Null)])),
    ]);
    assert_eq!(render("[{{#child}}{{title}}{{/child}}]", &model), "[]");
}

fn safe_bold(_: &Value, _: &mut Options<'_>) -> HelperResult {
    Ok(Some(Output::Safe("<b>".to_string())))
}

fn text_bold(_: &Value, _: &mut Options<'_>) -> HelperResult {
    Ok(Some(Output::Text("<b>".to_string())))
}

fn join(value: &Value, options: &mut Options<'_>) -> HelperResult {
    let separator = options
        .hash("sep")
        .map(Value::to_string)
        .unwrap_or_else(|| ",".to_string());
    let mut parts = vec![value.to_string()];
    parts.extend(options.params().iter().map(Value::to_string));
    Ok(Some(Output::Text(parts.join(&separator))))
}

#[test]
fn test_inline_helper_escaping() {
    let engine = Engine::builder()
        .helper("safe", safe_bold)
        .helper("text", text_bold)
        .build()
        .unwrap();
    assert_eq!(
        engine.render("{{safe}}|{{text}}|{{{text}}}", &Value::Null).unwrap(),
        "<b>|&lt;b&gt;|<b>"
    );
}

#[test]
fn test_helper_arguments() {
    let engine = Engine::builder().helper("join", join).build().unwrap();
    let model = Value::map([("a", "x")]);
    assert_eq!(
        engine.render("{{join a \"y\" 3 sep=\"-\"}}", &model).unwrap(),
        "x-y-3"
    );
}

#[test]
fn test_registered_helper_replaces_builtin() {
    fn always(_: &Value, _: &mut Options<'_>) -> HelperResult {
        Ok(Some(Output::from("replaced")))
    }

    let engine = Engine::builder().helper("if", always).build().unwrap();
    assert_eq!(
        engine.render("{{#if false}}x{{/if}}", &Value::Null).unwrap(),
        "replaced"
    );
}

#[test]
fn test_helper_sees_section_body() {
    fn twice(value: &Value, options: &mut Options<'_>) -> HelperResult {
        let once = options.render_body_with(value.clone())?;
        Ok(Some(Output::Text(format!("{}{}", once, once))))
    }

    let engine = Engine::builder().helper("twice", twice).build().unwrap();
    let model = Value::map([("word", "ha")]);
    assert_eq!(
        engine.render("{{#twice word}}{{.}}{{/twice}}", &model).unwrap(),
        "haha"
    );
}

#[test]
fn test_syntax_error_on_compile() {
    let err = Engine::new().compile("{{#open}}").unwrap_err();
    assert!(matches!(err, WhiskerError::Syntax(_)));
}

#[test]
fn test_helper_error_keeps_written_output() {
    let template = Engine::new()
        .compile("start {{#partial}}x{{/partial}} end")
        .unwrap();
    let mut out = Vec::new();
    let err = template
        .apply(&Value::map([("a", 1)]), &mut out)
        .unwrap_err();
    assert!(matches!(err, WhiskerError::ArgumentType { .. }));
    assert_eq!(out, b"start ");
}

#[test]
fn test_templates_render_across_threads() {
    let template = Engine::new()
        .compile("{{#each items}}{{.}}{{/each}}")
        .unwrap();

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|n| {
                let template = &template;
                s.spawn(move || {
                    let model = Value::map([("items", vec![n, n + 1])]);
                    template.render(&model).unwrap()
                })
            })
            .collect();
        for (n, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), format!("{}{}", n, n + 1));
        }
    });
}
