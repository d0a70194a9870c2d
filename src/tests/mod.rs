// Quarry's Test Infrastructure
//
// Integration-style tests for the scanner, staleness detector, scope
// resolver, search engine, call graph and collection step. Pure helpers keep
// their small unit tests inline next to the code.

pub mod helpers; // TestWorkspace, test analyzers, unique temp dirs

// ============================================================================
// CORE SYSTEM TESTS - Content store and workspace configuration
// ============================================================================
pub mod core {
    pub mod database; // Schema, transactional replace, cascade and queries
    pub mod workspace; // Config loading, validation and guardrail merging
}

pub mod scanner_tests; // Determinism, guardrails, artifacts, analyzer failures
