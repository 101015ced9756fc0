// Prompt construction for every kind of generated test. The builders are plain
// string formatting; the model sees exactly what is returned here.

use super::payload::LlmPayload;

/// Page the UI prompts point the model at.
pub const UI_BASE_URL: &str = "https://cloud.ru/calculator";

const MANUAL_TEST_EXAMPLE: &str = r#"import allure
from pytest import mark


@allure.manual
@allure.label("owner", "qa_team")
@allure.feature("UI Calculator")
@allure.story("Basic operations")
@allure.suite("manual")
@mark.manual
class TestCalculatorUI:
    @allure.title("Add two numbers")
    @allure.tag("CRITICAL")
    @allure.label("priority", "critical")
    def test_add_two_numbers(self) -> None:
        with allure.step("Arrange: open the calculator page"):
            pass
        with allure.step("Act: enter 2 and 3 and press ="):
            pass
        with allure.step("Assert: the display shows 5"):
            pass"#;

pub fn manual_test_prompt(requirements: &str) -> String {
    format!(
        r#"You are an experienced QA engineer. Write one manual test case in the
Allure TestOps as Code format (Python).

Conditions:
1. The test targets the price calculator.
2. Base URL of the calculator: {UI_BASE_URL}

Test requirements (scenario in natural language), give them top priority:
"""{requirements}"""

Required code format (an EXAMPLE of the expected answer):

{MANUAL_TEST_EXAMPLE}

Important:
- Output ONLY plain Python code, no Markdown, no ```python fences.
- Use the allure.step context manager, not allure_step.
- Include the imports: import allure and from pytest import mark.
- The code must run without errors.
- Do not add any text before or after the code.
"#
    )
}

pub fn ui_e2e_test_prompt(requirements: &str) -> String {
    format!(
        r#"You are a Senior QA Automation Engineer. Write a correct end-to-end
Playwright (Python) test for the following user scenario:

--- BEGIN REQUIREMENTS ---
{requirements}
--- END REQUIREMENTS ---

Conditions:
1. The test targets the price calculator.
2. Base URL of the calculator: {UI_BASE_URL}
3. Do not use calculator.net.
4. Build locators from:
   - button texts ("Add service")
   - CSS (#total-price, .product-card)
   - aria-label, placeholder, role

Test format:
- Python code only, no Markdown
- from playwright.sync_api import Page, expect
- AAA pattern with Arrange / Act / Assert comments
- def test_<description>(page: Page):
"#
    )
}

pub fn api_test_prompt(payload: &LlmPayload) -> String {
    let endpoint = render_payload(payload);
    format!(
        r#"You are a Senior QA Automation Engineer. Write automated API tests in
Python with pytest and httpx for the endpoint described below.

--- BEGIN ENDPOINT ---
{endpoint}
--- END ENDPOINT ---

Requirements:
- Start with: import pytest and import httpx.
- Declare a @pytest.fixture named auth_header returning the Authorization header.
- One test function per scenario, named def test_<scenario>(auth_header).
- Mark the Arrange / Act / Assert sections with comments in every test.
- Check the status code and the response body against response_schema,
  including required fields, uuid fields and enum values from fields_meta.
- Cover every scenario flagged in negative_cases (invalid uuid path params,
  missing required parameters, 404) and every status in error_schemas.
- Output ONLY plain Python code, no Markdown fences, no explanations.
"#
    )
}

pub fn api_manual_test_prompt(payload: &LlmPayload) -> String {
    let endpoint = render_payload(payload);
    format!(
        r#"You are an experienced QA engineer. Write manual test cases in the Allure
TestOps as Code format (Python) for the API endpoint described below.

--- BEGIN ENDPOINT ---
{endpoint}
--- END ENDPOINT ---

Required code format (an EXAMPLE of the expected structure):

{MANUAL_TEST_EXAMPLE}

Requirements:
- Include the imports: import allure and from pytest import mark.
- Decorate the class with @allure.manual and @mark.manual.
- Describe each step with `with allure.step("Arrange: ..."):` / Act / Assert.
- Cover the positive case, every scenario flagged in negative_cases and every
  status in error_schemas.
- Output ONLY plain Python code, no Markdown fences, no explanations.
"#
    )
}

fn render_payload(payload: &LlmPayload) -> String {
    // Serializing a tree of strings, maps and sequences cannot fail
    serde_json::to_string_pretty(payload).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::payload::{build_payload, PayloadMode};
    use crate::parser::{list_endpoints, OpenApiDocument};
    use serde_json::json;

    fn payload() -> LlmPayload {
        let doc = OpenApiDocument::new(json!({
            "paths": {"/v3/vms": {"get": {"summary": "List VMs", "responses": {}}}}
        }));
        let endpoints = list_endpoints(&doc);
        build_payload(&doc, &endpoints[0], PayloadMode::Auto).unwrap()
    }

    #[test]
    fn test_requirement_prompts_embed_requirements() {
        let manual = manual_test_prompt("Adding two VMs doubles the price");
        assert!(manual.contains("\"\"\"Adding two VMs doubles the price\"\"\""));
        assert!(manual.contains("@allure.manual"));

        let e2e = ui_e2e_test_prompt("Open the page");
        assert!(e2e.contains("--- BEGIN REQUIREMENTS ---\nOpen the page\n--- END REQUIREMENTS ---"));
        assert!(e2e.contains(UI_BASE_URL));
    }

    #[test]
    fn test_api_prompts_embed_payload_json() {
        let payload = payload();

        let auto = api_test_prompt(&payload);
        assert!(auto.contains("\"path\": \"/v3/vms\""));
        assert!(auto.contains("\"summary\": \"List VMs\""));
        assert!(auto.contains("auth_header"));

        let manual = api_manual_test_prompt(&payload);
        assert!(manual.contains("\"method\": \"GET\""));
        assert!(manual.contains("@mark.manual"));
    }
}
