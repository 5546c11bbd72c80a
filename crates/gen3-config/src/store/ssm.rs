//! AWS Systems Manager parameter store
use super::{LookupError, ParameterStore};
use crate::parameter::ParameterPath;
use aws_sdk_ssm::Client;

pub struct SsmParameterStore {
    client: Client,
}

impl SsmParameterStore {
    /// Client configured from the environment, optionally pinned to `region`
    pub async fn from_env(region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region));
        }

        let config = loader.load().await;
        tracing::info!(region = ?config.region(), "using ssm parameter store");

        Self {
            client: Client::new(&config),
        }
    }

    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl ParameterStore for SsmParameterStore {
    async fn get_parameter(&self, path: &ParameterPath) -> Result<Option<String>, LookupError> {
        let response = self.client.get_parameter().name(path.as_str()).send().await;

        match response {
            Ok(output) => Ok(Some(
                output
                    .parameter()
                    .and_then(|parameter| parameter.value())
                    .unwrap_or_default()
                    .to_string(),
            )),
            Err(err) => {
                let err = err.into_service_error();
                if err.is_parameter_not_found() {
                    return Ok(None);
                }

                Err(LookupError {
                    path: path.clone(),
                    source: Box::new(err),
                })
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parameter::Category;
    use aws_sdk_ssm::error::ProvideErrorMetadata;
    use aws_sdk_ssm::operation::get_parameter::GetParameterError;
    use aws_smithy_http_client::test_util::infallible_client_fn;
    use pretty_assertions::assert_eq;

    /// Store whose client answers every call with `status` and the json `body`
    fn answering(status: u16, body: &'static str) -> SsmParameterStore {
        let http_client = infallible_client_fn(move |_request| {
            http::Response::builder()
                .status(status)
                .header("content-type", "application/x-amz-json-1.1")
                .body(body)
                .unwrap()
        });
        let config = aws_sdk_ssm::Config::builder()
            .with_test_defaults_v2()
            .http_client(http_client)
            .build();

        SsmParameterStore::new(Client::from_conf(config))
    }

    #[tokio::test]
    async fn existing_parameter() {
        let store = answering(
            200,
            r#"{"Parameter":{"Name":"/gen3/config","Type":"String","Value":"{}","Version":1}}"#,
        );

        let value = store.get_parameter(&ParameterPath::global()).await.unwrap();
        assert_eq!(value.as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn not_found_is_absent() {
        let store = answering(400, r#"{"__type":"ParameterNotFound"}"#);

        let value = store
            .get_parameter(&ParameterPath::of("uat", Category::Roles))
            .await
            .unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn other_errors_carry_the_path() {
        let store = answering(
            400,
            r#"{"__type":"AccessDeniedException","message":"not authorized to perform ssm:GetParameter"}"#,
        );
        let path = ParameterPath::of("uat", Category::Cluster);

        let err = store.get_parameter(&path).await.unwrap_err();

        assert_eq!(err.path, path);
        assert!(err.to_string().contains("/gen3/uat/cluster-config"));
        let source = err
            .source
            .downcast_ref::<GetParameterError>()
            .expect("service error");
        assert_eq!(source.code(), Some("AccessDeniedException"));
    }
}
