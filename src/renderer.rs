//! HTML rendering of an [`ApiReport`].
//!
//! The renderer only reads the model: every field list and error descriptor is already
//! resolved by the time it gets here. Output is a single self-contained page with the
//! JSON snapshot of the report embedded in a `<script type="application/json">` block and
//! collapsible controller and endpoint sections. Expand/collapse state lives in the page
//! only.

use crate::error::Result;
use crate::extractor::{ControllerInfo, EndpointInfo, FieldInfo};
use crate::report::ApiReport;
use crate::serializer::serialize_json;
use log::debug;
use std::fmt::Write;

const STYLE: &str = r#"
        body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; margin: 0; padding: 20px; background-color: #1a1a1a; color: #ffffff; }
        .container { max-width: 1200px; margin: 0 auto; }
        .header { background: linear-gradient(135deg, #2c3e50 0%, #34495e 100%); padding: 30px; border-radius: 10px; margin-bottom: 30px; text-align: center; border: 1px solid #34495e; }
        .header h1 { margin: 0; font-size: 2.5em; font-weight: 300; }
        .header p { margin: 10px 0 0 0; opacity: 0.9; }
        .controller { background: #2d2d2d; border-radius: 10px; margin-bottom: 30px; overflow: hidden; border: 1px solid #404040; }
        .controller-header { background: linear-gradient(135deg, #3498db 0%, #2980b9 100%); padding: 20px; cursor: pointer; user-select: none; display: flex; justify-content: space-between; align-items: center; }
        .controller-header h2 { margin: 0; font-size: 1.5em; font-weight: 400; }
        .controller-header .module { opacity: 0.8; font-size: 0.9em; margin-top: 5px; }
        .controller-content, .endpoint-content { display: none; }
        .controller.expanded .controller-content, .endpoint.expanded .endpoint-content { display: block; }
        .toggle-icon { transition: transform 0.3s ease; transform: rotate(-90deg); }
        .expanded > .controller-header .toggle-icon, .expanded > .endpoint-header .toggle-icon { transform: rotate(0deg); }
        .endpoints { padding: 20px; }
        .endpoint { border: 1px solid #404040; border-radius: 8px; margin-bottom: 20px; overflow: hidden; background: #333333; }
        .endpoint-header { background: #404040; padding: 15px; display: flex; align-items: center; gap: 15px; cursor: pointer; user-select: none; }
        .endpoint-header .handler { margin-left: auto; opacity: 0.7; font-family: 'Courier New', monospace; }
        .method { padding: 5px 12px; border-radius: 4px; font-weight: bold; font-size: 0.9em; }
        .method.get { background-color: #27ae60; }
        .method.post { background-color: #3498db; }
        .method.put { background-color: #f39c12; color: black; }
        .method.delete { background-color: #e74c3c; }
        .method.patch { background-color: #9b59b6; }
        .path { font-family: 'Courier New', monospace; font-size: 1.1em; color: #ecf0f1; }
        .details { padding: 20px; }
        .detail-item { margin-bottom: 15px; }
        .detail-label { font-weight: bold; color: #3498db; margin-right: 10px; }
        .field-list { background: #2c3e50; border-radius: 6px; padding: 15px; margin-top: 10px; font-family: 'Courier New', monospace; }
        .exception { background: #8b0000; color: #ffcccc; padding: 12px; border-radius: 6px; margin: 8px 0; border-left: 4px solid #ff4444; }
        .exception-header { display: flex; align-items: center; gap: 10px; margin-bottom: 5px; }
        .error-code { background: #ff4444; padding: 2px 8px; border-radius: 3px; font-weight: bold; font-size: 0.8em; min-width: 40px; text-align: center; }
        .exception-type { font-family: 'Courier New', monospace; font-weight: bold; }
        .error-message { color: #ffaaaa; font-size: 0.9em; margin-top: 3px; }
"#;

const SCRIPT: &str = r#"
        function toggleController(id) {
            document.getElementById(id).classList.toggle('expanded');
        }
        function toggleEndpoint(id) {
            document.getElementById(id).classList.toggle('expanded');
        }
"#;

/// Element id of the embedded JSON snapshot.
pub const SNAPSHOT_ID: &str = "api-report-data";

/// Renders the complete HTML document for `report`.
pub fn render_html(report: &ApiReport) -> Result<String> {
    debug!("Rendering report with {} controllers", report.controllers.len());
    let mut out = String::new();
    let title = escape_html(&report.title);

    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html lang=\"en\">")?;
    writeln!(out, "<head>")?;
    writeln!(out, "    <meta charset=\"UTF-8\">")?;
    writeln!(out, "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">")?;
    writeln!(out, "    <title>{}</title>", title)?;
    writeln!(out, "    <style>{}    </style>", STYLE)?;
    writeln!(out, "    <script>{}    </script>", SCRIPT)?;
    writeln!(
        out,
        "    <script type=\"application/json\" id=\"{}\">{}</script>",
        SNAPSHOT_ID,
        embed_json(&serialize_json(report)?)
    )?;
    writeln!(out, "</head>")?;
    writeln!(out, "<body>")?;
    writeln!(out, "<div class=\"container\">")?;
    writeln!(out, "    <div class=\"header\">")?;
    writeln!(out, "        <h1>{}</h1>", title)?;
    writeln!(
        out,
        "        <p>{} modules | {} controllers | {} endpoints | {} error responses</p>",
        report.summary.modules, report.summary.controllers, report.summary.endpoints, report.summary.errors
    )?;
    writeln!(out, "    </div>")?;

    for (index, controller) in report.controllers.iter().enumerate() {
        render_controller(&mut out, index, controller)?;
    }

    writeln!(out, "</div>")?;
    writeln!(out, "</body>")?;
    writeln!(out, "</html>")?;

    Ok(out)
}

fn render_controller(out: &mut String, index: usize, controller: &ControllerInfo) -> Result<()> {
    let id = format!("controller-{}-{}", index, controller.class_name.to_lowercase());

    writeln!(out, "    <div class=\"controller\" id=\"{}\">", escape_html(&id))?;
    writeln!(
        out,
        "        <div class=\"controller-header\" onclick=\"toggleController('{}')\">",
        escape_html(&id)
    )?;
    writeln!(out, "            <div>")?;
    writeln!(out, "                <h2>{}</h2>", escape_html(&controller.class_name))?;
    writeln!(
        out,
        "                <div class=\"module\">Module: {} | File: {} | Base path: {}</div>",
        escape_html(&controller.module),
        escape_html(&controller.file_name),
        escape_html(&controller.base_path)
    )?;
    writeln!(out, "            </div>")?;
    writeln!(out, "            <div class=\"toggle-icon\">&#9660;</div>")?;
    writeln!(out, "        </div>")?;
    writeln!(out, "        <div class=\"controller-content\">")?;
    writeln!(out, "            <div class=\"endpoints\">")?;

    for (endpoint_index, endpoint) in controller.endpoints.iter().enumerate() {
        render_endpoint(out, &format!("{}-{}", id, endpoint_index), endpoint)?;
    }

    writeln!(out, "            </div>")?;
    writeln!(out, "        </div>")?;
    writeln!(out, "    </div>")?;
    Ok(())
}

fn render_endpoint(out: &mut String, id: &str, endpoint: &EndpointInfo) -> Result<()> {
    let method = endpoint.method.as_str();
    let id = escape_html(id);

    writeln!(out, "                <div class=\"endpoint\" id=\"{}\">", id)?;
    writeln!(
        out,
        "                    <div class=\"endpoint-header\" onclick=\"toggleEndpoint('{}')\">",
        id
    )?;
    writeln!(
        out,
        "                        <span class=\"method {}\">{}</span>",
        method.to_lowercase(),
        method
    )?;
    writeln!(out, "                        <span class=\"path\">{}</span>", escape_html(&endpoint.path))?;
    if !endpoint.handler_name.is_empty() {
        writeln!(
            out,
            "                        <span class=\"handler\">{}()</span>",
            escape_html(&endpoint.handler_name)
        )?;
    }
    writeln!(out, "                        <div class=\"toggle-icon\">&#9660;</div>")?;
    writeln!(out, "                    </div>")?;
    writeln!(out, "                    <div class=\"endpoint-content\">")?;
    writeln!(out, "                        <div class=\"details\">")?;

    let request = &endpoint.request_details;
    if !request.path_variables.is_empty() {
        writeln!(
            out,
            "                            <div class=\"detail-item\"><span class=\"detail-label\">Path Variables:</span> <code>{}</code></div>",
            escape_html(&request.path_variables.join(", "))
        )?;
    }

    if let Some(body_type) = &request.body_type {
        render_model(out, "Request Model", body_type, &request.body_fields)?;
    }

    let response = &endpoint.response_details;
    if !response.raw_type.is_empty() {
        let label = match &response.element_type {
            Some(element) if response.is_collection => format!("{} (list of {})", response.raw_type, element),
            _ => response.raw_type.clone(),
        };
        render_model(out, "Response Model", &label, &response.fields)?;
    }

    if !endpoint.errors.is_empty() {
        writeln!(out, "                            <div class=\"detail-item\">")?;
        writeln!(out, "                                <span class=\"detail-label\">Errors:</span>")?;
        writeln!(out, "                                <div class=\"exceptions\">")?;
        for error in &endpoint.errors {
            writeln!(out, "                                    <div class=\"exception\">")?;
            writeln!(out, "                                        <div class=\"exception-header\">")?;
            writeln!(
                out,
                "                                            <span class=\"error-code\">{}</span>",
                escape_html(&error.code)
            )?;
            writeln!(
                out,
                "                                            <span class=\"exception-type\">{}</span>",
                escape_html(&error.error_type)
            )?;
            writeln!(out, "                                        </div>")?;
            writeln!(
                out,
                "                                        <div class=\"error-message\">{}</div>",
                escape_html(&error.display_message)
            )?;
            writeln!(out, "                                    </div>")?;
        }
        writeln!(out, "                                </div>")?;
        writeln!(out, "                            </div>")?;
    }

    writeln!(out, "                        </div>")?;
    writeln!(out, "                    </div>")?;
    writeln!(out, "                </div>")?;
    Ok(())
}

/// Writes a pseudo-object view of `fields`, one `"name": Type?` line per field.
fn render_model(out: &mut String, label: &str, type_label: &str, fields: &[FieldInfo]) -> Result<()> {
    writeln!(out, "                            <div class=\"detail-item\">")?;
    writeln!(
        out,
        "                                <span class=\"detail-label\">{}:</span> <code>{}</code>",
        label,
        escape_html(type_label)
    )?;
    if !fields.is_empty() {
        writeln!(out, "                                <div class=\"field-list\">")?;
        writeln!(out, "                                    <div class=\"field\"><code>{{</code></div>")?;
        for line in pseudo_object_lines(fields) {
            writeln!(
                out,
                "                                    <div class=\"field\"><code>&nbsp;&nbsp;{}</code></div>",
                escape_html(&line)
            )?;
        }
        writeln!(out, "                                    <div class=\"field\"><code>}}</code></div>")?;
        writeln!(out, "                                </div>")?;
    }
    writeln!(out, "                            </div>")?;
    Ok(())
}

/// `"name": Type?` lines with commas between entries.
pub fn pseudo_object_lines(fields: &[FieldInfo]) -> Vec<String> {
    let last = fields.len().saturating_sub(1);
    fields
        .iter()
        .enumerate()
        .map(|(index, field)| {
            format!(
                "\"{}\": {}{}{}",
                field.name,
                field.type_name,
                if field.nullable { "?" } else { "" },
                if index < last { "," } else { "" }
            )
        })
        .collect()
}

/// Escapes text for HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Makes JSON safe to place inside a `<script>` element.
fn embed_json(json: &str) -> String {
    json.replace("</", "<\\/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::{ErrorInfo, HttpMethod, ParameterBinding, ParameterInfo, RequestDetails, ResponseDetails};
    use crate::report::ReportBuilder;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn sample_report() -> ApiReport {
        let mut request_details = RequestDetails::from_parameters(vec![ParameterInfo::new(ParameterBinding::Path {
            name: "id".to_string(),
            type_name: "Long".to_string(),
        })]);
        request_details.body_fields = Vec::new();

        let endpoint = EndpointInfo {
            method: HttpMethod::Get,
            path: "/api/v1/bookings/{id}".to_string(),
            handler_name: "getBooking".to_string(),
            request_type: "Long".to_string(),
            response_type: "BookingResponse".to_string(),
            request_details,
            response_details: ResponseDetails {
                raw_type: "BookingResponse".to_string(),
                is_collection: false,
                element_type: None,
                fields: vec![
                    FieldInfo::new("id", "Long", false),
                    FieldInfo::new("notes", "String", true),
                ],
            },
            errors: vec![ErrorInfo {
                error_type: "BookingNotFoundException".to_string(),
                message: None,
                code: "404".to_string(),
                display_message: "Booking not found".to_string(),
            }],
        };

        let mut builder = ReportBuilder::new(Path::new("/project")).with_title("Bookings <v1>");
        builder.add_controller(ControllerInfo {
            module: "booking".to_string(),
            file_name: "BookingController.kt".to_string(),
            class_name: "BookingController".to_string(),
            base_path: "/api/v1/bookings".to_string(),
            endpoints: vec![endpoint],
        });
        builder.build()
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("List<A> & \"b\""), "List&lt;A&gt; &amp; &quot;b&quot;");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_pseudo_object_lines() {
        let fields = vec![FieldInfo::new("id", "Long", false), FieldInfo::new("notes", "String", true)];
        assert_eq!(pseudo_object_lines(&fields), vec!["\"id\": Long,", "\"notes\": String?"]);
        assert!(pseudo_object_lines(&[]).is_empty());
    }

    #[test]
    fn test_render_contains_sections() {
        let html = render_html(&sample_report()).unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Bookings &lt;v1&gt;</title>"));
        assert!(html.contains("<span class=\"method get\">GET</span>"));
        assert!(html.contains("/api/v1/bookings/{id}"));
        assert!(html.contains("<code>id</code>"));
        assert!(html.contains("&quot;notes&quot;: String?"));
        assert!(html.contains("<span class=\"error-code\">404</span>"));
        assert!(html.contains("<div class=\"error-message\">Booking not found</div>"));
        assert!(html.contains("toggleController('controller-0-bookingcontroller')"));
        assert!(html.contains("toggleEndpoint('controller-0-bookingcontroller-0')"));
    }

    #[test]
    fn test_snapshot_is_embedded_and_parseable() {
        let mut report = sample_report();
        report.controllers[0].base_path = "</script><b>".to_string();
        let html = render_html(&report).unwrap();

        let marker = format!("<script type=\"application/json\" id=\"{}\">", SNAPSHOT_ID);
        let start = html.find(&marker).unwrap() + marker.len();
        let end = start + html[start..].find("</script>").unwrap();
        let snapshot = &html[start..end];

        assert!(!snapshot.contains("</"));
        let parsed: ApiReport = serde_json::from_str(snapshot).unwrap();
        assert_eq!(parsed, report);
    }
}
