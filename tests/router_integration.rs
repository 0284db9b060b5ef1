use std::sync::Arc;

use trellis_router::macros::{FuncArg, ParamPredicate};
use trellis_router::{FindResult, ParamValue, Router, RouterError, TrieError};

fn expect_found<'r, H>(result: FindResult<'r, H>) -> (&'r H, Vec<(String, ParamValue)>) {
    match result {
        FindResult::Found(matched) => (matched.handler, matched.params),
        FindResult::Rejected { name, error_code, .. } => {
            panic!("unexpected rejection of '{name}' with code {error_code}")
        }
        FindResult::NotFound => panic!("unexpected not-found"),
    }
}

#[test]
fn typed_parameters_convert_before_the_handler_runs() {
    let mut router = Router::new();
    router
        .add("/users/{id:int min(1) max(5) else 400}", "user_show")
        .expect("route should register");

    let (handler, params) = expect_found(router.find("/users/3"));
    assert_eq!(*handler, "user_show");
    assert_eq!(params, vec![("id".to_string(), ParamValue::Int(3))]);
}

#[test]
fn failing_validation_rejects_with_the_route_error_code() {
    let mut router = Router::new();
    router
        .add("/users/{id:int min(1) max(5) else 400}", "user_show")
        .expect("route should register");

    match router.find("/users/9") {
        FindResult::Rejected {
            name, error_code, ..
        } => {
            assert_eq!(name, "id");
            assert_eq!(error_code, 400);
        }
        _ => panic!("expected rejection"),
    }

    match router.find("/users/abc") {
        FindResult::Rejected { error_code, .. } => assert_eq!(error_code, 400),
        _ => panic!("expected rejection"),
    }
}

#[test]
fn default_error_code_is_404() {
    let mut router = Router::new();
    router.add("/n/{id:int}", "n").expect("route should register");

    match router.find("/n/abc") {
        FindResult::Rejected { error_code, .. } => assert_eq!(error_code, 404),
        _ => panic!("expected rejection"),
    }
}

#[test]
fn bare_parameters_pass_through_untouched() {
    let mut router = Router::new();
    router.add("/p/{name}", "p").expect("route should register");

    let (_, params) = expect_found(router.find("/p/whatever"));
    assert_eq!(
        params,
        vec![("name".to_string(), ParamValue::Str("whatever".to_string()))]
    );
}

#[test]
fn trailing_path_parameter_collects_the_remainder() {
    let mut router = Router::new();
    router
        .add("/assets/{rest:path}", "assets")
        .expect("route should register");

    let (handler, params) = expect_found(router.find("/assets/css/app.css"));
    assert_eq!(*handler, "assets");
    assert_eq!(
        params,
        vec![(
            "rest".to_string(),
            ParamValue::Str("css/app.css".to_string())
        )]
    );
}

#[test]
fn request_paths_are_normalized_before_lookup() {
    let mut router = Router::new();
    router
        .add("/users/{id:int}", "user_show")
        .expect("route should register");

    let (_, params) = expect_found(router.find("/users/3/"));
    assert_eq!(params, vec![("id".to_string(), ParamValue::Int(3))]);

    let (_, params) = expect_found(router.find("//users//3"));
    assert_eq!(params, vec![("id".to_string(), ParamValue::Int(3))]);

    assert!(matches!(router.find("/users/9999"), FindResult::Found(_)));
    assert!(matches!(router.find("/missing"), FindResult::NotFound));
}

#[test]
fn routes_normalizing_to_the_same_shape_conflict() {
    let mut router = Router::new();
    router
        .add("/users/{id:int}", "a")
        .expect("first route should register");

    let err = router
        .add("/users/{id:uint8}", "b")
        .expect_err("same trie shape should conflict");
    match err {
        RouterError::Trie(TrieError::DuplicateRoute { .. }) => {}
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn parse_errors_surface_at_registration_time() {
    let mut router = Router::new();
    let err = router
        .add("/users/{id:nosuchtype}", "broken")
        .expect_err("unknown type should fail registration");
    match err {
        RouterError::Template(_) => {}
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(router.route_count(), 0);
}

#[test]
fn custom_function_registered_before_the_route_applies() {
    let mut router = Router::new();
    router
        .macros_mut()
        .lookup_mut("int")
        .expect("int macro exists")
        .register_func(
            "even",
            &[],
            Arc::new(|_args: &[FuncArg]| {
                let pred: ParamPredicate =
                    Arc::new(|v: &ParamValue| matches!(v, ParamValue::Int(n) if n % 2 == 0));
                Ok(pred)
            }),
        )
        .expect("function registration");

    router
        .add("/n/{id:int even()}", "even_only")
        .expect("route should register");

    assert!(matches!(router.find("/n/4"), FindResult::Found(_)));
    assert!(matches!(router.find("/n/3"), FindResult::Rejected { .. }));
}

#[test]
fn macro_error_handler_supplies_the_rejection_message() {
    let mut router = Router::new();
    router
        .macros_mut()
        .lookup_mut("int")
        .expect("int macro exists")
        .handle_error(Arc::new(|raw: &str| format!("'{raw}' is not an integer")));

    router.add("/n/{id:int}", "n").expect("route should register");

    match router.find("/n/abc") {
        FindResult::Rejected { message, .. } => {
            assert_eq!(message.as_deref(), Some("'abc' is not an integer"));
        }
        _ => panic!("expected rejection"),
    }
}

#[test]
fn mixed_static_and_dynamic_routes_coexist() {
    let mut router = Router::new();
    router.add("/", "home").expect("route");
    router.add("/users", "users_index").expect("route");
    router.add("/users/{id:int}", "user_show").expect("route");
    router.add("/users/new", "user_new").expect("route");
    router.add("/static/{f:path}", "static_files").expect("route");

    let (handler, _) = expect_found(router.find("/"));
    assert_eq!(*handler, "home");
    let (handler, _) = expect_found(router.find("/users"));
    assert_eq!(*handler, "users_index");
    let (handler, _) = expect_found(router.find("/users/new"));
    assert_eq!(*handler, "user_new");
    let (handler, params) = expect_found(router.find("/users/8"));
    assert_eq!(*handler, "user_show");
    assert_eq!(params, vec![("id".to_string(), ParamValue::Int(8))]);
    let (handler, params) = expect_found(router.find("/static/js/a/b.js"));
    assert_eq!(*handler, "static_files");
    assert_eq!(
        params,
        vec![("f".to_string(), ParamValue::Str("js/a/b.js".to_string()))]
    );
}
