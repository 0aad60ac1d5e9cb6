//! Lexical scope tree with binding identities.
//!
//! Every declared name gets a [`BindingId`] that is independent of its text.
//! Identifier uses are resolved to bindings by walking up the scope chain
//! after the whole file has been visited, so hoisted functions and `var`s
//! resolve the same way they do at runtime.

use crate::cst::{SyntaxNode, SyntaxTree, TextRange};
use rustc_hash::FxHashMap;
use serde::Serialize;

/// Index of a scope in [`ScopeTree::scopes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ScopeId(pub u32);

/// Identity of one declared binding, unique within a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BindingId(pub u32);

/// Kind of lexical region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    /// The whole file.
    Module,
    /// Function, method or arrow function (parameters and body).
    Function,
    /// `{ ... }` block or switch body.
    Block,
    /// Head of a `for` loop.
    For,
    /// `catch (e)` clause.
    Catch,
    /// Class body, holds the name of a class expression.
    Class,
}

impl ScopeKind {
    /// Whether `var` declarations hoist to this scope.
    #[must_use]
    pub const fn is_function_like(self) -> bool {
        matches!(self, Self::Module | Self::Function)
    }
}

/// How a name was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingKind {
    /// `var`
    Var,
    /// `let`
    Let,
    /// `const`
    Const,
    /// Function declaration or named function expression.
    Function,
    /// Class declaration or named class expression.
    Class,
    /// Function parameter.
    Parameter,
    /// `catch` parameter.
    CatchParameter,
    /// Import binding.
    Import,
    /// Enum, namespace, interface or type alias (TypeScript).
    Type,
}

impl BindingKind {
    /// Variable-like bindings introduced by a declarator.
    #[must_use]
    pub const fn is_variable(self) -> bool {
        matches!(self, Self::Var | Self::Let | Self::Const)
    }
}

/// Syntactic shape of an identifier occurrence.
///
/// Shorthand forms cannot be renamed in place without changing meaning;
/// the form tells a rename how to expand them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OccurrenceForm {
    /// A bare identifier.
    Plain,
    /// `{ name }` in an object literal.
    ObjectShorthand,
    /// `{ name }` or `{ name = default }` in a destructuring pattern.
    PatternShorthand,
    /// `export { name }` without an alias.
    ExportSpecifier,
    /// Component name in a JSX tag; only capitalized names resolve to bindings.
    JsxTag,
}

/// A lexical region.
#[derive(Debug, Clone, Serialize)]
pub struct Scope {
    /// Region kind.
    pub kind: ScopeKind,
    /// Enclosing scope, `None` for the module scope.
    pub parent: Option<ScopeId>,
    /// Byte range of the region.
    pub range: TextRange,
    #[serde(skip)]
    names: FxHashMap<String, BindingId>,
}

impl Scope {
    fn new(kind: ScopeKind, parent: Option<ScopeId>, range: TextRange) -> Self {
        Self {
            kind,
            parent,
            range,
            names: FxHashMap::default(),
        }
    }

    /// Binding declared directly in this scope under `name`.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<BindingId> {
        self.names.get(name).copied()
    }
}

/// One place where a binding is declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeclarationSite {
    /// Range of the name identifier.
    pub range: TextRange,
    /// Shape of the identifier.
    pub form: OccurrenceForm,
}

/// A declared name with a stable identity.
#[derive(Debug, Clone, Serialize)]
pub struct Binding {
    /// Identity.
    pub id: BindingId,
    /// Declared name.
    pub name: String,
    /// Declaration kind of the first declaration.
    pub kind: BindingKind,
    /// Scope the binding lives in.
    pub scope: ScopeId,
    /// Every declaration of this name in `scope`, in source order.
    pub declarations: Vec<DeclarationSite>,
    /// Declared inside an `export` statement.
    pub exported: bool,
}

/// A non-declaring identifier occurrence.
#[derive(Debug, Clone, Serialize)]
pub struct Reference {
    /// Identifier text.
    pub name: String,
    /// Range of the identifier.
    pub range: TextRange,
    /// Shape of the identifier.
    pub form: OccurrenceForm,
    /// Innermost scope containing the occurrence.
    pub scope: ScopeId,
    /// Resolved binding, `None` for globals.
    pub binding: Option<BindingId>,
}

/// Scopes, bindings and resolved references of one file.
#[derive(Debug, Clone, Default)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    bindings: Vec<Binding>,
    references: Vec<Reference>,
    by_site: FxHashMap<usize, BindingId>,
    uses: Vec<Vec<usize>>,
}

impl ScopeTree {
    /// Build the scope tree for a parsed file.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn build(tree: &SyntaxTree) -> Self {
        let mut builder = ScopeBuilder::new(tree);
        builder.visit_program(&tree.root);
        let scope_tree = builder.finish();
        tracing::debug!(
            scopes = scope_tree.scopes.len(),
            bindings = scope_tree.bindings.len(),
            references = scope_tree.references.len(),
            "scope tree built"
        );
        scope_tree
    }

    /// All scopes; index 0 is the module scope.
    #[must_use]
    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    /// Look up a scope.
    #[must_use]
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0 as usize]
    }

    /// All bindings in declaration order.
    #[must_use]
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Look up a binding.
    #[must_use]
    pub fn binding(&self, id: BindingId) -> &Binding {
        &self.bindings[id.0 as usize]
    }

    /// All references in source order.
    #[must_use]
    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    /// Binding declared by the identifier at `range`.
    #[must_use]
    pub fn binding_at(&self, range: TextRange) -> Option<BindingId> {
        self.by_site.get(&range.start).copied()
    }

    /// References resolved to `id`.
    pub fn references_to(&self, id: BindingId) -> impl Iterator<Item = &Reference> + '_ {
        self.uses[id.0 as usize]
            .iter()
            .map(|&i| &self.references[i])
    }

    /// Number of references resolved to `id`.
    #[must_use]
    pub fn reference_count(&self, id: BindingId) -> usize {
        self.uses[id.0 as usize].len()
    }

    /// Nearest enclosing function or module scope, including `id` itself.
    #[must_use]
    pub fn function_scope_of(&self, mut id: ScopeId) -> ScopeId {
        loop {
            let scope = self.scope(id);
            match scope.parent {
                Some(parent) if !scope.kind.is_function_like() => id = parent,
                _ => return id,
            }
        }
    }

    /// Innermost scope containing `offset`.
    #[must_use]
    pub fn scope_at(&self, offset: usize) -> ScopeId {
        // Scopes are created in pre-order, so the last one containing the
        // offset is the innermost.
        self.scopes
            .iter()
            .rposition(|s| s.range.start <= offset && offset < s.range.end)
            .map_or(ScopeId(0), |i| ScopeId(i as u32))
    }

    /// Resolve `name` as seen from `scope`.
    #[must_use]
    pub fn resolve(&self, scope: ScopeId, name: &str) -> Option<BindingId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = self.scope(id);
            if let Some(binding) = scope.lookup(name) {
                return Some(binding);
            }
            current = scope.parent;
        }
        None
    }
}

/// Collects declarations and references in one pass; resolution runs last.
struct ScopeBuilder<'t> {
    source: &'t str,
    scopes: Vec<Scope>,
    bindings: Vec<Binding>,
    references: Vec<Reference>,
    by_site: FxHashMap<usize, BindingId>,
    stack: Vec<ScopeId>,
}

impl<'t> ScopeBuilder<'t> {
    fn new(tree: &'t SyntaxTree) -> Self {
        Self {
            source: &tree.source,
            scopes: Vec::new(),
            bindings: Vec::new(),
            references: Vec::new(),
            by_site: FxHashMap::default(),
            stack: Vec::new(),
        }
    }

    fn finish(mut self) -> ScopeTree {
        let mut uses = vec![Vec::new(); self.bindings.len()];
        for (i, reference) in self.references.iter_mut().enumerate() {
            let mut current = Some(reference.scope);
            while let Some(id) = current {
                let scope = &self.scopes[id.0 as usize];
                if let Some(binding) = scope.lookup(&reference.name) {
                    reference.binding = Some(binding);
                    uses[binding.0 as usize].push(i);
                    break;
                }
                current = scope.parent;
            }
        }
        ScopeTree {
            scopes: self.scopes,
            bindings: self.bindings,
            references: self.references,
            by_site: self.by_site,
            uses,
        }
    }

    fn current(&self) -> ScopeId {
        self.stack.last().copied().unwrap_or(ScopeId(0))
    }

    fn push_scope(&mut self, kind: ScopeKind, range: TextRange) {
        let id = ScopeId(self.scopes.len() as u32);
        let parent = self.stack.last().copied();
        self.scopes.push(Scope::new(kind, parent, range));
        self.stack.push(id);
    }

    fn pop_scope(&mut self) {
        self.stack.pop();
    }

    fn hoist_target(&self) -> ScopeId {
        for &id in self.stack.iter().rev() {
            if self.scopes[id.0 as usize].kind.is_function_like() {
                return id;
            }
        }
        ScopeId(0)
    }

    fn declare(&mut self, node: &SyntaxNode, kind: BindingKind, form: OccurrenceForm) {
        let name = node.text(self.source);
        if name.is_empty() {
            return;
        }
        let scope = if kind == BindingKind::Var {
            self.hoist_target()
        } else {
            self.current()
        };
        let site = DeclarationSite {
            range: node.range,
            form,
        };
        let existing = self.scopes[scope.0 as usize].lookup(name);
        let id = if let Some(id) = existing {
            self.bindings[id.0 as usize].declarations.push(site);
            id
        } else {
            let id = BindingId(self.bindings.len() as u32);
            self.bindings.push(Binding {
                id,
                name: name.to_owned(),
                kind,
                scope,
                declarations: vec![site],
                exported: false,
            });
            self.scopes[scope.0 as usize]
                .names
                .insert(name.to_owned(), id);
            id
        };
        self.by_site.insert(node.range.start, id);
    }

    fn reference(&mut self, node: &SyntaxNode, form: OccurrenceForm) {
        let name = node.text(self.source);
        if name.is_empty() {
            return;
        }
        self.references.push(Reference {
            name: name.to_owned(),
            range: node.range,
            form,
            scope: self.current(),
            binding: None,
        });
    }

    fn visit_program(&mut self, root: &SyntaxNode) {
        self.push_scope(ScopeKind::Module, root.full_range());
        self.visit_children(root);
        self.pop_scope();
    }

    fn visit_children(&mut self, node: &SyntaxNode) {
        for child in &node.children {
            self.visit(child);
        }
    }

    fn visit(&mut self, node: &SyntaxNode) {
        match node.kind {
            "identifier" | "type_identifier" => self.reference(node, OccurrenceForm::Plain),
            "shorthand_property_identifier" => {
                self.reference(node, OccurrenceForm::ObjectShorthand);
            }
            "shorthand_property_identifier_pattern" => {
                self.reference(node, OccurrenceForm::PatternShorthand);
            }
            "comment" | "string" | "regex" | "property_identifier" | "statement_identifier" => {}

            "function_declaration" | "generator_function_declaration" | "function_signature" => {
                if let Some(name) = node.child_by_field("name") {
                    self.declare(name, BindingKind::Function, OccurrenceForm::Plain);
                }
                self.visit_function(node, None);
            }
            "function_expression" | "function" | "generator_function" => {
                self.visit_function(node, node.child_by_field("name"));
            }
            "arrow_function" | "method_definition" => {
                if let Some(name) = node.child_by_field("name") {
                    if name.kind == "computed_property_name" {
                        self.visit(name);
                    }
                }
                self.visit_function(node, None);
            }
            "class_declaration" | "abstract_class_declaration" => {
                if let Some(name) = node.child_by_field("name") {
                    self.declare(name, BindingKind::Class, OccurrenceForm::Plain);
                }
                self.visit_class(node, None);
            }
            "class" => self.visit_class(node, node.child_by_field("name")),

            "statement_block" | "switch_body" | "class_static_block" => {
                self.push_scope(ScopeKind::Block, node.range);
                self.visit_children(node);
                self.pop_scope();
            }
            "for_statement" => {
                self.push_scope(ScopeKind::For, node.range);
                self.visit_children(node);
                self.pop_scope();
            }
            "for_in_statement" => self.visit_for_in(node),
            "catch_clause" => {
                self.push_scope(ScopeKind::Catch, node.range);
                for child in &node.children {
                    if child.field == Some("parameter") {
                        self.declare_pattern(child, BindingKind::CatchParameter);
                    } else {
                        self.visit(child);
                    }
                }
                self.pop_scope();
            }

            "lexical_declaration" | "variable_declaration" => {
                let kind = declaration_kind(node, self.source);
                for child in &node.children {
                    if child.kind == "variable_declarator" {
                        self.visit_declarator(child, kind);
                    } else {
                        self.visit(child);
                    }
                }
            }

            "import_statement" => self.visit_import(node),
            "export_statement" => self.visit_export(node),

            "enum_declaration" | "internal_module" | "module" | "interface_declaration"
            | "type_alias_declaration" => {
                for child in &node.children {
                    if child.field == Some("name")
                        && matches!(child.kind, "identifier" | "type_identifier")
                    {
                        self.declare(child, BindingKind::Type, OccurrenceForm::Plain);
                    } else {
                        self.visit(child);
                    }
                }
            }

            "jsx_opening_element" | "jsx_closing_element" | "jsx_self_closing_element" => {
                for child in &node.children {
                    if child.field != Some("name") {
                        self.visit(child);
                    } else if child.kind == "identifier" {
                        if !is_intrinsic_element(child, self.source) {
                            self.reference(child, OccurrenceForm::JsxTag);
                        }
                    } else {
                        self.visit(child);
                    }
                }
            }

            _ => self.visit_children(node),
        }
    }

    /// Parameters and body share one function scope.
    fn visit_function(&mut self, node: &SyntaxNode, own_name: Option<&SyntaxNode>) {
        self.push_scope(ScopeKind::Function, node.range);
        if let Some(name) = own_name {
            self.declare(name, BindingKind::Function, OccurrenceForm::Plain);
        }
        for child in &node.children {
            match child.field {
                Some("name") => {}
                Some("parameter") => self.declare_pattern(child, BindingKind::Parameter),
                Some("parameters") => {
                    for param in child.named_children() {
                        self.declare_parameter(param);
                    }
                }
                Some("body") if child.kind == "statement_block" => self.visit_children(child),
                _ => self.visit(child),
            }
        }
        self.pop_scope();
    }

    fn declare_parameter(&mut self, param: &SyntaxNode) {
        match param.kind {
            "required_parameter" | "optional_parameter" => {
                for child in &param.children {
                    if child.field == Some("pattern") {
                        self.declare_pattern(child, BindingKind::Parameter);
                    } else {
                        self.visit(child);
                    }
                }
            }
            "decorator" | "this" => self.visit(param),
            _ => self.declare_pattern(param, BindingKind::Parameter),
        }
    }

    fn visit_class(&mut self, node: &SyntaxNode, own_name: Option<&SyntaxNode>) {
        self.push_scope(ScopeKind::Class, node.range);
        if let Some(name) = own_name {
            self.declare(name, BindingKind::Class, OccurrenceForm::Plain);
        }
        for child in &node.children {
            if child.field != Some("name") {
                self.visit(child);
            }
        }
        self.pop_scope();
    }

    fn visit_for_in(&mut self, node: &SyntaxNode) {
        self.push_scope(ScopeKind::For, node.range);
        let kind = node
            .child_by_field("kind")
            .map(|k| binding_kind_for_keyword(k.text(self.source)));
        for child in &node.children {
            match (child.field, kind) {
                (Some("left"), Some(kind)) => self.declare_pattern(child, kind),
                _ => self.visit(child),
            }
        }
        self.pop_scope();
    }

    fn visit_declarator(&mut self, declarator: &SyntaxNode, kind: BindingKind) {
        for child in &declarator.children {
            if child.field == Some("name") {
                self.declare_pattern(child, kind);
            } else {
                self.visit(child);
            }
        }
    }

    /// Declare every name bound by a pattern; defaults and computed keys are uses.
    fn declare_pattern(&mut self, node: &SyntaxNode, kind: BindingKind) {
        match node.kind {
            "identifier" => self.declare(node, kind, OccurrenceForm::Plain),
            "shorthand_property_identifier_pattern" => {
                self.declare(node, kind, OccurrenceForm::PatternShorthand);
            }
            "object_pattern" | "array_pattern" => {
                for child in node.named_children() {
                    self.declare_pattern(child, kind);
                }
            }
            "pair_pattern" => {
                for child in &node.children {
                    if child.field == Some("value") {
                        self.declare_pattern(child, kind);
                    } else if child.kind == "computed_property_name" {
                        self.visit(child);
                    }
                }
            }
            "object_assignment_pattern" | "assignment_pattern" => {
                for child in &node.children {
                    if child.field == Some("left") {
                        self.declare_pattern(child, kind);
                    } else {
                        self.visit(child);
                    }
                }
            }
            "rest_pattern" => {
                for child in node.named_children() {
                    self.declare_pattern(child, kind);
                }
            }
            _ => self.visit(node),
        }
    }

    fn visit_import(&mut self, node: &SyntaxNode) {
        for clause in node.named_children() {
            match clause.kind {
                "import_clause" => {
                    for part in clause.named_children() {
                        match part.kind {
                            "identifier" => {
                                self.declare(part, BindingKind::Import, OccurrenceForm::Plain);
                            }
                            "namespace_import" => {
                                if let Some(local) = part.child_of_kind("identifier") {
                                    self.declare(local, BindingKind::Import, OccurrenceForm::Plain);
                                }
                            }
                            "named_imports" => {
                                for spec in part.named_children() {
                                    if let Some(local) = import_local_name(spec) {
                                        self.declare(
                                            local,
                                            BindingKind::Import,
                                            OccurrenceForm::Plain,
                                        );
                                    }
                                }
                            }
                            _ => {}
                        }
                    }
                }
                "import_require_clause" => {
                    if let Some(local) = clause.child_of_kind("identifier") {
                        self.declare(local, BindingKind::Import, OccurrenceForm::Plain);
                    }
                }
                _ => {}
            }
        }
    }

    fn visit_export(&mut self, node: &SyntaxNode) {
        let reexport = node.child_by_field("source").is_some();
        for child in &node.children {
            match (child.field, child.kind) {
                (Some("declaration"), _) => {
                    let first_new = self.bindings.len();
                    let scope = self.current();
                    self.visit(child);
                    for binding in &mut self.bindings[first_new..] {
                        if binding.scope == scope {
                            binding.exported = true;
                        }
                    }
                }
                (_, "export_clause") if !reexport => {
                    for spec in child.named_children() {
                        let Some(name) = spec.child_by_field("name") else {
                            continue;
                        };
                        if name.kind != "identifier" {
                            continue;
                        }
                        let form = if spec.child_by_field("alias").is_some() {
                            OccurrenceForm::Plain
                        } else {
                            OccurrenceForm::ExportSpecifier
                        };
                        self.reference(name, form);
                    }
                }
                (_, "export_clause" | "namespace_export") => {}
                _ => self.visit(child),
            }
        }
    }
}

/// Local name bound by an import specifier: the alias, else the imported name.
pub(crate) fn import_local_name(spec: &SyntaxNode) -> Option<&SyntaxNode> {
    if spec.kind != "import_specifier" {
        return None;
    }
    spec.child_by_field("alias")
        .or_else(|| spec.child_by_field("name"))
        .filter(|n| n.kind == "identifier")
}

fn declaration_kind(node: &SyntaxNode, source: &str) -> BindingKind {
    if node.kind == "variable_declaration" {
        return BindingKind::Var;
    }
    node.child_by_field("kind")
        .map_or(BindingKind::Let, |k| binding_kind_for_keyword(k.text(source)))
}

fn binding_kind_for_keyword(keyword: &str) -> BindingKind {
    match keyword {
        "var" => BindingKind::Var,
        "const" => BindingKind::Const,
        _ => BindingKind::Let,
    }
}

/// `<div>` names a host element, not a binding.
fn is_intrinsic_element(name: &SyntaxNode, source: &str) -> bool {
    name.kind == "identifier"
        && name
            .text(source)
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_lowercase())
}
