use super::*;

#[test]
fn builds_get_with_encoded_identifier() {
    let request = RequestBuilder::get(endpoint("http://127.0.0.1:7777", "/favourites"))
        .context(&RequestContext::new("anna maria&co"))
        .build()
        .expect("request");

    assert_eq!(request.method, Method::GET);
    assert_eq!(
        request.url.as_str(),
        "http://127.0.0.1:7777/favourites?u=anna+maria%26co"
    );
    assert!(request.body.is_none());
}

#[test]
fn keeps_extra_parameters_in_insertion_order() {
    let context = RequestContext::new("bob")
        .with_param("t", "Weekend")
        .with_param("loc", "Cinema")
        .with_param("comp", "Partner");
    let request = RequestBuilder::get(endpoint("http://host:7777/", "/"))
        .context(&context)
        .build()
        .expect("request");

    assert_eq!(
        request.url.query(),
        Some("u=bob&t=Weekend&loc=Cinema&comp=Partner")
    );
    assert_eq!(request.url.path(), "/");
}

#[test]
fn attaches_json_body_for_post() {
    let request = RequestBuilder::post(endpoint("http://host:7777", "favourites"))
        .param("u", "bob")
        .json_body(&vec!["Alien".to_string()])
        .expect("body")
        .build()
        .expect("request");

    assert_eq!(request.method, Method::POST);
    assert_eq!(request.body, Some(serde_json::json!(["Alien"])));
}

#[test]
fn non_utf8_value_is_substituted_with_empty_string() {
    let request = RequestBuilder::get("http://host:7777/favourites")
        .param("u", [0xff_u8, 0xfe, 0x41])
        .build()
        .expect("request");

    assert_eq!(request.url.query(), Some("u="));
}

#[test]
fn encodes_non_ascii_text() {
    assert_eq!(encode_value("Amélie".as_bytes()), "Am%C3%A9lie");
}

#[test]
fn rejects_unparseable_endpoint() {
    let err = RequestBuilder::get("not a url")
        .build()
        .expect_err("invalid endpoint");
    assert!(matches!(err, RequestError::InvalidEndpoint { .. }));
}

#[test]
fn endpoint_preserves_base_path_prefix() {
    assert_eq!(
        endpoint("http://host/api/", "/favourites"),
        "http://host/api/favourites"
    );
}
