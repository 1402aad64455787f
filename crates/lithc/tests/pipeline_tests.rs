//! End-to-end tests for the front-end pipeline.
//!
//! These tests drive whole files through scanning, parsing and semantic
//! analysis and check the diagnostics and results a driver would see.

use lithium_compiler::common::{Category, Severity};
use lithium_compiler::frontend::ast::DeclKind;
use lithium_compiler::frontend::{CompileStatus, Stage, TokenKind};
use lithium_compiler::{FrontendConfig, Pipeline};
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn pipeline() -> Pipeline {
    Pipeline::new(FrontendConfig {
        include_paths: vec![fixture("lib")],
        ..FrontendConfig::default()
    })
}

fn short_diagnostics(output: &lithium_compiler::FrontendOutput) -> String {
    let mut out = Vec::new();
    output.reporter.emit_short(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_compile_main_fixture() {
    let output = pipeline().compile_file(&fixture("main.li"));
    assert!(
        output.succeeded(),
        "unexpected diagnostics:\n{}",
        short_diagnostics(&output)
    );

    let includes: Vec<_> = output
        .includes
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(includes, vec!["helpers.li", "shared.li"]);
    assert!(output.includes[1].ends_with("lib/shared.li"));

    assert_eq!(output.imports.len(), 1);
    assert_eq!(output.imports[0].module, "mathlib");
    assert_eq!(output.imports[0].names, vec!["square", "PI"]);

    let symbols = output.symbols.as_ref().unwrap();
    let ty = |name: &str| symbols.lookup_symbol(name).unwrap().ty.to_string();
    assert_eq!(ty("area"), "fn(float) -> float");
    assert_eq!(ty("sum3"), "fn(int, int, int) -> int");
    assert_eq!(ty("total"), "int");
    assert_eq!(ty("circle"), "float");

    let program = output.program.as_ref().unwrap();
    assert_eq!(program.functions().count(), 2);
    assert!(matches!(program.declarations[0].kind, DeclKind::Include(_)));
}

#[test]
fn test_type_errors_are_all_reported() {
    let output = pipeline().compile_file(&fixture("type_errors.li"));
    assert_eq!(output.status, CompileStatus::Failed(Stage::Analyze));

    let found: Vec<_> = output
        .reporter
        .diagnostics()
        .iter()
        .map(|d| (d.category, d.position.line))
        .collect();
    assert_eq!(
        found,
        vec![
            (Category::Type, 1),
            (Category::Semantic, 2),
            (Category::Type, 4),
        ]
    );

    let symbols = output.symbols.as_ref().unwrap();
    assert_eq!(symbols.lookup_symbol("fine").unwrap().ty.to_string(), "int");
}

#[test]
fn test_short_format_lists_location_and_context() {
    let output = pipeline().compile_file(&fixture("type_errors.li"));
    let rendered = short_diagnostics(&output);
    let first = rendered.lines().take(2).collect::<Vec<_>>();

    let path = fixture("type_errors.li").display().to_string();
    assert_eq!(
        first,
        vec![
            format!("{path}:1:20: error: type mismatch: expected 'string', found 'int'"),
            "  let name: string = 5".to_string(),
        ]
    );
}

#[test]
fn test_syntax_errors_recover_per_line() {
    let output = pipeline().compile_file(&fixture("syntax_errors.li"));
    assert_eq!(output.status, CompileStatus::Failed(Stage::Parse));
    assert!(output.symbols.is_none());

    let lines: Vec<_> = output
        .reporter
        .diagnostics()
        .iter()
        .map(|d| {
            assert_eq!(d.category, Category::Syntax);
            d.position.line
        })
        .collect();
    assert_eq!(lines, vec![1, 3]);

    let program = output.program.as_ref().unwrap();
    let names: Vec<_> = program.variables().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["ok", "also_ok"]);
}

#[test]
fn test_unterminated_string_stops_the_pipeline() {
    let output = pipeline().compile_file(&fixture("unterminated.li"));
    assert_eq!(output.status, CompileStatus::Failed(Stage::Scan));

    let diagnostics = output.reporter.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].severity, Severity::Fatal);
    assert_eq!(diagnostics[0].category, Category::Lexical);
    assert_eq!(
        (diagnostics[0].position.line, diagnostics[0].position.column),
        (2, 9)
    );

    let last = output.tokens.last().unwrap();
    assert_eq!(last.kind, TokenKind::Eof);
    assert_eq!(output.tokens.len(), 9);
}

#[test]
fn test_self_include_fixture() {
    let output = pipeline().compile_file(&fixture("self_include.li"));
    assert_eq!(output.status, CompileStatus::Failed(Stage::Analyze));
    assert_eq!(output.reporter.diagnostics()[0].category, Category::FileIo);
    assert!(output.includes.is_empty());
}

#[test]
fn test_module_path_option() {
    let source = "from shared import shared_value\nlet doubled = shared_value * 2\n";

    let output = pipeline().compile_source(source, "inline.li");
    assert_eq!(output.reporter.error_count(), 2);

    let with_modules = Pipeline::new(FrontendConfig {
        module_paths: vec![fixture("lib")],
        ..FrontendConfig::default()
    });
    let output = with_modules.compile_source(source, "inline.li");
    assert!(output.succeeded(), "{}", short_diagnostics(&output));
    let symbols = output.symbols.unwrap();
    assert_eq!(symbols.lookup_symbol("doubled").unwrap().ty.to_string(), "int");
}

#[test]
fn test_human_rendering_mentions_file_and_category() {
    use codespan_reporting::term::termcolor::NoColor;

    let output = pipeline().compile_source("let x: string = 5\n", "inline.li");
    let mut writer = NoColor::new(Vec::new());
    output.reporter.emit(&mut writer).unwrap();
    let rendered = String::from_utf8(writer.into_inner()).unwrap();
    assert!(rendered.contains("type error"));
    assert!(rendered.contains("inline.li:1:17"));
}
