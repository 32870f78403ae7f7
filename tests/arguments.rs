use gh_explore::explore::{IntegrationGetArgs, SearchArgs, ShowcaseGetArgs, TrendingArgs};
use gh_explore::{AppError, Config, Explore};

fn explore() -> Explore {
    Explore::new(&Config::default()).unwrap()
}

fn argument_message(err: AppError) -> String {
    match err {
        AppError::Argument(message) => message,
        other => panic!("expected an argument error, got: {other}"),
    }
}

#[tokio::test]
async fn showcase_get_requires_a_showcase() {
    let err = explore()
        .showcases()
        .get(&ShowcaseGetArgs::default())
        .await
        .unwrap_err();
    assert_eq!(argument_message(err), "showcase required");
}

#[tokio::test]
async fn an_empty_showcase_counts_as_missing() {
    let args = ShowcaseGetArgs {
        showcase: Some(String::new()),
        sort: Some("language".to_string()),
    };
    let err = explore().showcases().get(&args).await.unwrap_err();
    assert_eq!(argument_message(err), "showcase required");
}

#[tokio::test]
async fn showcase_search_requires_a_query() {
    let err = explore()
        .showcases()
        .search(&SearchArgs::default())
        .await
        .unwrap_err();
    assert_eq!(argument_message(err), "query required");
}

#[tokio::test]
async fn integration_get_requires_an_integration() {
    let err = explore()
        .integrations()
        .get(&IntegrationGetArgs::default())
        .await
        .unwrap_err();
    assert_eq!(argument_message(err), "integration required");
}

#[tokio::test]
async fn integration_search_requires_a_query() {
    let err = explore()
        .integrations()
        .search(&SearchArgs::default())
        .await
        .unwrap_err();
    assert_eq!(argument_message(err), "query required");
}

#[tokio::test]
async fn trending_rejects_unknown_types_before_fetching() {
    // Valid language and since do not rescue an unsupported type.
    let args = TrendingArgs {
        kind: Some("languages".to_string()),
        language: Some("java".to_string()),
        since: Some("weekly".to_string()),
    };
    let err = explore().trending().list(&args).await.unwrap_err();
    assert_eq!(argument_message(err), "invalid value for argument type");
}
