use dsconfig_client::models::certificate_mapper::{
    AddCertificateMapperRequest, AddThirdPartyCertificateMapperRequest, CertificateMapperApi,
    CertificateMapperType,
};
use dsconfig_client::models::scim_subattribute::ScimSubattributeApi;
use dsconfig_client::{
    ApiError, ConfigApi, HttpConfig, HttpConfigApi, ObjectPath, Operation, UpdateRequest,
};
use serde_json::json;
use wiremock::matchers::{basic_auth, body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api(server: &MockServer) -> HttpConfigApi {
    HttpConfigApi::new(HttpConfig {
        https_host: server.uri(),
        username: "cn=administrator".to_string(),
        password: "2FederateM0re".to_string(),
        insecure_trust_all_tls: false,
        ca_certificates_pem: vec![],
        user_agent: "dsconfig-client-tests".to_string(),
    })
    .unwrap()
}

fn third_party_body(name: &str) -> serde_json::Value {
    json!({
        "schemas": ["urn:pingidentity:schemas:configuration:2.0:certificate-mapper:third-party"],
        "id": name,
        "enabled": true,
        "extensionClass": "com.example.Mapper",
    })
}

#[tokio::test]
async fn get_sends_basic_auth_and_decodes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/config/v2/certificate-mappers/tp"))
        .and(basic_auth("cn=administrator", "2FederateM0re"))
        .respond_with(ResponseTemplate::new(200).set_body_json(third_party_body("tp")))
        .expect(1)
        .mount(&server)
        .await;

    let mapper = api(&server).get_certificate_mapper("tp").await.unwrap();
    assert_eq!(mapper.type_(), CertificateMapperType::ThirdParty);
    assert_eq!(mapper.id(), "tp");
}

#[tokio::test]
async fn add_posts_to_collection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/config/v2/certificate-mappers"))
        .and(body_json(json!({
            "schemas": ["urn:pingidentity:schemas:configuration:2.0:certificate-mapper:third-party"],
            "mapperName": "tp",
            "enabled": true,
            "extensionClass": "com.example.Mapper",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(third_party_body("tp")))
        .expect(1)
        .mount(&server)
        .await;

    let request = AddCertificateMapperRequest::ThirdParty(AddThirdPartyCertificateMapperRequest {
        mapper_name: "tp".to_string(),
        description: None,
        enabled: true,
        extension_class: "com.example.Mapper".to_string(),
        extension_argument: vec![],
    });
    let mapper = api(&server).add_certificate_mapper(&request).await.unwrap();
    assert_eq!(mapper.id(), "tp");
}

#[tokio::test]
async fn update_patches_operations() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/config/v2/certificate-mappers/tp"))
        .and(body_json(json!({
            "operations": [
                {"op": "replace", "path": "enabled", "value": "false"},
                {"op": "add", "path": "extensionArgument", "values": ["a=b"]},
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(third_party_body("tp")))
        .expect(1)
        .mount(&server)
        .await;

    let request = UpdateRequest::new(vec![
        Operation::replace("enabled", "false"),
        Operation::add_values("extensionArgument", vec!["a=b".to_string()]),
    ]);
    api(&server)
        .update_certificate_mapper("tp", &request)
        .await
        .unwrap();
}

#[tokio::test]
async fn delete_accepts_empty_body() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/config/v2/certificate-mappers/tp"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    api(&server).delete_certificate_mapper("tp").await.unwrap();
}

#[tokio::test]
async fn not_found_is_distinguished() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/config/v2/certificate-mappers/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"status": 404})))
        .mount(&server)
        .await;

    let err = api(&server)
        .get_certificate_mapper("missing")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn server_errors_carry_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/config/v2/certificate-mappers"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = api(&server)
        .add(&ObjectPath::collection("certificate-mappers"), json!({}))
        .await
        .unwrap_err();
    match err {
        ApiError::Status { status, body, .. } => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn list_passes_filter_and_reads_resources() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(
            "/config/v2/scim-schemas/urn:example:schema/scim-attributes/emails/scim-subattributes",
        ))
        .and(query_param("filter", "type eq \"string\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "schemas": ["urn:pingidentity:schemas:2.0:configuration:ListResponse"],
            "Resources": [
                {"id": "value", "name": "value", "type": "string"},
                {"id": "display", "name": "display", "type": "string"},
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let subattributes = api(&server)
        .list_scim_subattributes("urn:example:schema", "emails", Some("type eq \"string\""))
        .await
        .unwrap();
    let names: Vec<&str> = subattributes.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["value", "display"]);
}
