// Structural checklists for generated code. These look for the expected
// imports, decorators and patterns; they do not parse Python. A failed check
// adds a human-readable reason to `errors` and never aborts the request.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static STARTS_WITH_IMPORT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(import|from)\s+").unwrap());
static CLASS_DEF: Lazy<Regex> = Lazy::new(|| Regex::new(r"class\s+\w+").unwrap());
static TEST_FN_DEF: Lazy<Regex> = Lazy::new(|| Regex::new(r"def\s+test_\w+").unwrap());
static PYTEST_FIXTURE: Lazy<Regex> = Lazy::new(|| Regex::new(r"@pytest\.fixture").unwrap());

const MARKDOWN_FENCE: &str = "```";

fn looks_like_python(code: &str) -> bool {
    STARTS_WITH_IMPORT.is_match(code)
}

fn has_aaa_markers(code: &str) -> bool {
    code.contains("Arrange") && code.contains("Act") && code.contains("Assert")
}

/// Checklist for Allure TestOps-as-code manual tests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManualTestValidation {
    pub is_python: bool,
    pub imports_ok: bool,
    pub has_class: bool,
    pub has_allure_manual: bool,
    pub has_mark_manual: bool,
    pub has_steps: bool,
    pub aaa_ok: bool,
    pub errors: Vec<String>,
}

/// Checklist for Playwright end-to-end tests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct E2eTestValidation {
    pub is_python: bool,
    pub imports_ok: bool,
    pub has_test_fn: bool,
    pub uses_playwright: bool,
    pub aaa_ok: bool,
    pub no_markdown: bool,
    pub errors: Vec<String>,
}

/// Checklist for pytest + httpx API tests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiTestValidation {
    pub is_python: bool,
    pub imports_ok: bool,
    pub has_fixture: bool,
    pub has_test_fn: bool,
    pub aaa_ok: bool,
    pub no_markdown: bool,
    pub errors: Vec<String>,
}

/// Any of the checklists, serialized as its bare fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Validation {
    Manual(ManualTestValidation),
    E2e(E2eTestValidation),
    Api(ApiTestValidation),
}

impl Validation {
    pub fn errors(&self) -> &[String] {
        match self {
            Validation::Manual(v) => &v.errors,
            Validation::E2e(v) => &v.errors,
            Validation::Api(v) => &v.errors,
        }
    }

    pub fn passed(&self) -> bool {
        self.errors().is_empty()
    }
}

/// Records a check outcome, pushing `reason` when it failed.
fn check(flag: &mut bool, ok: bool, errors: &mut Vec<String>, reason: &str) {
    *flag = ok;
    if !ok {
        errors.push(reason.to_string());
    }
}

pub fn validate_manual_test(code: &str) -> ManualTestValidation {
    let mut v = ManualTestValidation::default();
    let mut errors = Vec::new();

    check(
        &mut v.is_python,
        looks_like_python(code),
        &mut errors,
        "Code does not look like Python (no leading import/from).",
    );
    check(
        &mut v.imports_ok,
        code.contains("import allure") && code.contains("from pytest import mark"),
        &mut errors,
        "Missing `import allure` or `from pytest import mark`.",
    );
    check(&mut v.has_class, CLASS_DEF.is_match(code), &mut errors, "No test class found.");
    check(
        &mut v.has_allure_manual,
        code.contains("@allure.manual"),
        &mut errors,
        "Missing @allure.manual decorator.",
    );
    check(
        &mut v.has_mark_manual,
        code.contains("@mark.manual"),
        &mut errors,
        "Missing @mark.manual decorator.",
    );

    let has_steps = code.contains("with allure.step");
    check(&mut v.has_steps, has_steps, &mut errors, "No `with allure.step` steps.");
    check(
        &mut v.aaa_ok,
        has_aaa_markers(code) || has_steps,
        &mut errors,
        "No Arrange/Act/Assert pattern.",
    );

    v.errors = errors;
    v
}

pub fn validate_e2e_test(code: &str) -> E2eTestValidation {
    let mut v = E2eTestValidation::default();
    let mut errors = Vec::new();

    check(
        &mut v.is_python,
        looks_like_python(code),
        &mut errors,
        "Code does not look like Python.",
    );

    let playwright = code.contains("from playwright.sync_api");
    check(
        &mut v.imports_ok,
        playwright,
        &mut errors,
        "Missing `from playwright.sync_api` import.",
    );
    v.uses_playwright = playwright;

    check(
        &mut v.has_test_fn,
        TEST_FN_DEF.is_match(code),
        &mut errors,
        "No test_ function.",
    );
    check(
        &mut v.aaa_ok,
        has_aaa_markers(code),
        &mut errors,
        "No Arrange/Act/Assert pattern.",
    );
    check(
        &mut v.no_markdown,
        !code.contains(MARKDOWN_FENCE),
        &mut errors,
        "Code contains ``` Markdown fences.",
    );

    v.errors = errors;
    v
}

pub fn validate_pytest_api(code: &str) -> ApiTestValidation {
    let mut v = ApiTestValidation::default();
    let mut errors = Vec::new();

    check(
        &mut v.is_python,
        looks_like_python(code),
        &mut errors,
        "Code does not look like Python.",
    );
    check(
        &mut v.imports_ok,
        code.contains("import httpx") && code.contains("import pytest"),
        &mut errors,
        "Missing `import pytest` or `import httpx`.",
    );
    check(
        &mut v.has_fixture,
        PYTEST_FIXTURE.is_match(code) && code.contains("auth_header"),
        &mut errors,
        "No @pytest.fixture auth_header fixture.",
    );
    check(
        &mut v.has_test_fn,
        TEST_FN_DEF.is_match(code),
        &mut errors,
        "No test_ function.",
    );
    check(
        &mut v.aaa_ok,
        has_aaa_markers(code),
        &mut errors,
        "No Arrange/Act/Assert pattern.",
    );
    check(
        &mut v.no_markdown,
        !code.contains(MARKDOWN_FENCE),
        &mut errors,
        "Code contains ``` Markdown fences.",
    );

    v.errors = errors;
    v
}
