use std::collections::BTreeMap;

pub const MULTIPART_BOUNDARY: &str = "---------------------------147122027520121970202652868316";
pub const MULTIPART_CONTENT_TYPE: &str =
    "multipart/form-data; boundary=---------------------------147122027520121970202652868316";
pub const MULTIPART_BODY: &str = "-----------------------------147122027520121970202652868316\r\n\
    Content-Disposition: form-data; name=\"name\"\r\n\r\n\
    Jane Doe\r\n\
    -----------------------------147122027520121970202652868316\r\n\
    Content-Disposition: form-data; name=\"email\"\r\n\r\n\
    jane@example.net\r\n\
    -----------------------------147122027520121970202652868316\r\n\
    Content-Disposition: form-data; name=\"subject\"\r\n\r\n\
    Email Subject\r\n\
    -----------------------------147122027520121970202652868316\r\n\
    Content-Disposition: form-data; name=\"message\"\r\n\r\n\
    I would like to inquire about your services.\r\n\
    -----------------------------147122027520121970202652868316--\r\n";

pub const URLENCODED_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
pub const URLENCODED_BODY: &str = "name=Jane+Doe&email=jane%40example.net&subject=Email+Subject\
    &message=I+would+like+to+inquire+about+your+services.";

/// The fields carried by [`MULTIPART_BODY`] and [`URLENCODED_BODY`].
pub fn form_fields() -> BTreeMap<String, String> {
    [
        ("name", "Jane Doe"),
        ("email", "jane@example.net"),
        ("subject", "Email Subject"),
        ("message", "I would like to inquire about your services."),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), value.to_string()))
    .collect()
}

/// Encodes `fields` as a `multipart/form-data` body delimited by [`MULTIPART_BOUNDARY`].
pub fn multipart_body(fields: &[(&str, &str)]) -> String {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{MULTIPART_BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{name}\"\r\n\r\n\
             {value}\r\n"
        ));
    }
    body.push_str(&format!("--{MULTIPART_BOUNDARY}--\r\n"));
    body
}
