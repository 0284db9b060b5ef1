use std::sync::Arc;

use trellis_router::macros::{
    self, ArgKind, FuncArg, MacroError, MacroSet, ParamPredicate, ParamType, ParamValue,
};

fn even_builder() -> macros::ParamFuncBuilder {
    Arc::new(|_args: &[FuncArg]| {
        let pred: ParamPredicate =
            Arc::new(|v: &ParamValue| matches!(v, ParamValue::Int(n) if n % 2 == 0));
        Ok(pred)
    })
}

fn odd_builder() -> macros::ParamFuncBuilder {
    Arc::new(|_args: &[FuncArg]| {
        let pred: ParamPredicate =
            Arc::new(|v: &ParamValue| matches!(v, ParamValue::Int(n) if n % 2 != 0));
        Ok(pred)
    })
}

#[test]
fn registering_a_second_master_fails() {
    let mut macros = MacroSet::with_defaults();
    let err = macros
        .register(
            ParamType::new("custom").with_master(),
            Some(Arc::new(|raw: &str| Some(ParamValue::Str(raw.to_string())))),
        )
        .expect_err("second master should be rejected");

    match err {
        MacroError::MasterAlreadyRegistered { existing } => assert_eq!(existing, "string"),
        other => panic!("unexpected error: {other:?}"),
    }
    // the original master is untouched
    assert_eq!(
        macros.master().map(|m| m.param_type().indent.as_str()),
        Some("string")
    );
}

#[test]
fn registering_a_taken_indent_fails() {
    let mut macros = MacroSet::with_defaults();
    let err = macros
        .register(
            ParamType::new("int"),
            Some(Arc::new(|raw: &str| Some(ParamValue::Str(raw.to_string())))),
        )
        .expect_err("taken indent should be rejected");
    match err {
        MacroError::IndentTaken { indent } => assert_eq!(indent, "int"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn registering_an_indent_that_shadows_an_alias_fails() {
    let mut macros = MacroSet::with_defaults();
    let err = macros
        .register(
            ParamType::new("long"),
            Some(Arc::new(|raw: &str| Some(ParamValue::Str(raw.to_string())))),
        )
        .expect_err("alias shadowing should be rejected");
    match err {
        MacroError::IndentTaken { indent } => assert_eq!(indent, "long"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn registering_a_taken_alias_fails() {
    let mut macros = MacroSet::with_defaults();
    let err = macros
        .register(
            ParamType::new("whole").with_alias("number"),
            Some(Arc::new(|raw: &str| Some(ParamValue::Str(raw.to_string())))),
        )
        .expect_err("taken alias should be rejected");
    match err {
        MacroError::AliasTaken { alias } => assert_eq!(alias, "number"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn registration_requires_indent_and_evaluator() {
    let mut macros = MacroSet::with_defaults();

    let err = macros
        .register(
            ParamType::new(""),
            Some(Arc::new(|raw: &str| Some(ParamValue::Str(raw.to_string())))),
        )
        .expect_err("empty indent should be rejected");
    match err {
        MacroError::EmptyIndent => {}
        other => panic!("unexpected error: {other:?}"),
    }

    let err = macros
        .register(ParamType::new("custom"), None)
        .expect_err("missing evaluator should be rejected");
    match err {
        MacroError::MissingEvaluator { indent } => assert_eq!(indent, "custom"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn unregister_removes_indent_and_alias_lookups() {
    let mut macros = MacroSet::with_defaults();
    assert!(macros.lookup("boolean").is_some());
    assert!(macros.unregister("bool"));
    assert!(macros.lookup("bool").is_none());
    assert!(macros.lookup("boolean").is_none());
    assert!(!macros.unregister("bool"));
}

#[test]
fn custom_zero_argument_function_binds_and_filters() {
    let mut macros = MacroSet::with_defaults();
    macros
        .lookup_mut("int")
        .expect("int macro exists")
        .register_func("even", &[], even_builder())
        .expect("registration should succeed");

    let template =
        macros::parse("/n/{id:int even()}", &macros).expect("template should compile");
    let param = &template.params[0];
    assert_eq!(param.eval("4").and_then(|v| v.as_int()), Some(4));
    assert!(param.eval("3").is_none());
}

#[test]
fn reregistering_a_function_name_replaces_it_silently() {
    let mut macros = MacroSet::with_defaults();
    let int_macro = macros.lookup_mut("int").expect("int macro exists");
    int_macro
        .register_func("even", &[], even_builder())
        .expect("first registration");
    int_macro
        .register_func("even", &[], odd_builder())
        .expect("replacement registration");

    let template =
        macros::parse("/n/{id:int even()}", &macros).expect("template should compile");
    let param = &template.params[0];
    assert!(param.eval("4").is_none());
    assert_eq!(param.eval("3").and_then(|v| v.as_int()), Some(3));
}

#[test]
fn invalid_function_names_are_rejected_at_registration() {
    let mut macros = MacroSet::with_defaults();
    let err = macros
        .lookup_mut("int")
        .expect("int macro exists")
        .register_func("bad name", &[], even_builder())
        .expect_err("invalid name should be rejected");
    match err {
        MacroError::InvalidFuncName { name } => assert_eq!(name, "bad name"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn custom_registered_type_is_usable_in_templates() {
    let mut macros = MacroSet::with_defaults();
    macros
        .register(
            ParamType::new("hex"),
            Some(Arc::new(|raw: &str| {
                u64::from_str_radix(raw, 16).ok().map(ParamValue::Uint)
            })),
        )
        .expect("registration should succeed");

    let template = macros::parse("/h/{v:hex}", &macros).expect("template should compile");
    let param = &template.params[0];
    assert_eq!(param.eval("ff").and_then(|v| v.as_uint()), Some(255));
    assert!(param.eval("zz").is_none());
}

#[test]
fn slice_arguments_bind_through_the_in_function() {
    let macros = MacroSet::with_defaults();
    let template =
        macros::parse("/x/{kind in([a,b,c])}", &macros).expect("template should compile");
    let param = &template.params[0];
    assert!(param.eval("a").is_some());
    assert!(param.eval("b").is_some());
    assert!(param.eval("z").is_none());
}

#[test]
fn uint8_range_validates_width_then_bounds() {
    let macros = MacroSet::with_defaults();
    let template =
        macros::parse("/x/{n:uint8 range(1,10)}", &macros).expect("template should compile");
    let param = &template.params[0];
    assert_eq!(param.eval("5").and_then(|v| v.as_uint()), Some(5));
    assert!(param.eval("0").is_none());
    assert!(param.eval("200").is_none()); // parses as u8, fails the range
    assert!(param.eval("300").is_none()); // fails the u8 evaluator
}

#[test]
fn arity_mismatch_is_a_bind_error() {
    let macros = MacroSet::with_defaults();
    let err = macros::parse("/x/{n:int range(1)}", &macros).expect_err("arity should fail");
    match err {
        macros::TemplateError::Bind { func, source, .. } => {
            assert_eq!(func, "range");
            match source {
                MacroError::ArgumentCount {
                    expected, found, ..
                } => {
                    assert_eq!(expected, 2);
                    assert_eq!(found, 1);
                }
                other => panic!("unexpected bind error: {other:?}"),
            }
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn invalid_regexp_is_a_bind_error() {
    let macros = MacroSet::with_defaults();
    let err = macros::parse("/x/{v regexp([)}", &macros).expect_err("regex should fail");
    match err {
        macros::TemplateError::Bind { func, source, .. } => {
            assert_eq!(func, "regexp");
            match source {
                MacroError::InvalidRegexp { .. } => {}
                other => panic!("unexpected bind error: {other:?}"),
            }
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn bool_evaluator_accepts_the_usual_spellings() {
    let macros = MacroSet::with_defaults();
    let template = macros::parse("/x/{b:bool}", &macros).expect("template should compile");
    let param = &template.params[0];
    assert_eq!(param.eval("true").and_then(|v| v.as_bool()), Some(true));
    assert_eq!(param.eval("0").and_then(|v| v.as_bool()), Some(false));
    assert_eq!(param.eval("T").and_then(|v| v.as_bool()), Some(true));
    assert!(param.eval("yes").is_none());
}

#[test]
fn alphabetical_and_file_evaluators_filter_their_alphabets() {
    let macros = MacroSet::with_defaults();

    let alpha = macros::parse("/x/{w:alphabetical}", &macros).expect("template should compile");
    assert!(alpha.params[0].eval("hello").is_some());
    assert!(alpha.params[0].eval("hello1").is_none());

    let file = macros::parse("/x/{f:file}", &macros).expect("template should compile");
    assert!(file.params[0].eval("app-v1.2_final.css").is_some());
    assert!(file.params[0].eval("a/b").is_none());
}

#[test]
fn string_length_bounds_apply_to_typeless_params() {
    let macros = MacroSet::with_defaults();
    let template =
        macros::parse("/x/{slug min(3) max(5)}", &macros).expect("template should compile");
    let param = &template.params[0];
    assert!(param.eval("abc").is_some());
    assert!(param.eval("ab").is_none());
    assert!(param.eval("abcdef").is_none());
}

#[test]
fn coercion_normalizes_at_declared_width() {
    assert_eq!(
        macros::coerce_arg(ArgKind::Uint16, "9000"),
        Some(FuncArg::Uint(9000))
    );
    assert_eq!(macros::coerce_arg(ArgKind::Uint16, "70000"), None);
    assert_eq!(
        macros::coerce_arg(ArgKind::Float64, "2.5"),
        Some(FuncArg::Float(2.5))
    );
}
