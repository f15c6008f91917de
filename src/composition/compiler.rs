use std::collections::BTreeSet;

use super::model::*;
use crate::errors::CompositionError;
use crate::name::CanonicalName;

const IF: &str = "if(";
const ELSEIF: &str = "elseif(";
const ELSE: &str = "else{";

/// Compile `raw` into the instructions that concern `owner`.
///
/// Chain positions not adjacent to the owner are discarded. Owner occurrences
/// are found by structural equality of parsed canonical names, never by
/// substring search, so `c:S1` does not match a term holding `c:S10`.
///
/// # Errors
/// * [`CompositionError::Syntax`] for malformed text or invalid names
/// * [`CompositionError::OwnerNotFound`] when `owner` appears in no clause
pub fn compile(raw: &str, owner: &CanonicalName) -> Result<CompiledComposition, CompositionError> {
    let mut compiler = Compiler {
        raw,
        owner,
        next_id: 0,
        participants: BTreeSet::new(),
    };
    let text = strip_whitespace(raw)?;
    let mut instructions = Vec::new();

    for clause in split_top_level(raw, &text, ';')? {
        if clause.is_empty() {
            continue;
        }
        let instruction = if clause.starts_with(IF) {
            compiler.conditional(clause)?
        } else {
            let statements = compiler.chain(clause)?;
            if statements.is_empty() {
                continue;
            }
            Instruction::Unconditional(statements)
        };
        instructions.push(instruction);
    }

    let found = instructions.iter().any(|i| i.statements().next().is_some());
    if !found {
        return Err(CompositionError::OwnerNotFound {
            owner: owner.to_string(),
            composition: raw.to_string(),
        });
    }

    Ok(CompiledComposition {
        raw: raw.to_string(),
        owner: owner.clone(),
        instructions,
        participants: compiler.participants,
    })
}

/// Services named in the first term of the first chain of `raw`.
///
/// These are the services an orchestrator injects a request into.
pub fn entry_services(raw: &str) -> Result<Vec<CanonicalName>, CompositionError> {
    let text = strip_whitespace(raw)?;
    let first = split_top_level(raw, &text, ';')?
        .into_iter()
        .find(|clause| !clause.is_empty())
        .ok_or_else(|| CompositionError::syntax(raw, "composition is empty"))?;
    if first.starts_with(IF) {
        return Err(CompositionError::syntax(raw, "composition cannot start with a condition"));
    }
    let head = first.split('+').next().unwrap_or_default();
    Ok(parse_term(raw, head)?.names)
}

struct Compiler<'a> {
    raw: &'a str,
    owner: &'a CanonicalName,
    next_id: usize,
    participants: BTreeSet<CanonicalName>,
}

struct Term {
    and: bool,
    names: Vec<CanonicalName>,
}

impl Compiler<'_> {
    fn syntax(&self, reason: impl Into<String>) -> CompositionError {
        CompositionError::syntax(self.raw, reason)
    }

    fn next_id(&mut self) -> StatementId {
        let id = StatementId(self.next_id);
        self.next_id += 1;
        id
    }

    /// One statement per owner occurrence in a `+` chain.
    fn chain(&mut self, chain: &str) -> Result<Vec<Statement>, CompositionError> {
        if chain.starts_with(IF) || chain.contains(['{', '}', '(', ')']) {
            return Err(self.syntax(format!("unexpected block in chain '{}'", chain)));
        }
        let terms = chain
            .split('+')
            .map(|term| parse_term(self.raw, term))
            .collect::<Result<Vec<_>, _>>()?;
        self.participants
            .extend(terms.iter().flat_map(|term| term.names.iter().cloned()));

        let mut statements: Vec<Statement> = Vec::new();
        for (i, term) in terms.iter().enumerate() {
            if !term.names.contains(self.owner) {
                continue;
            }
            let input_links: BTreeSet<CanonicalName> = match i.checked_sub(1) {
                Some(prev) => terms[prev].names.iter().cloned().collect(),
                None => BTreeSet::new(),
            };
            let output_links: BTreeSet<CanonicalName> = terms
                .get(i + 1)
                .map(|next| next.names.iter().cloned().collect())
                .unwrap_or_default();
            let and_group = if term.and {
                if input_links.is_empty() {
                    return Err(self.syntax(format!(
                        "'&{}' heads its chain and has nothing to wait for",
                        self.owner
                    )));
                }
                Some(input_links.clone())
            } else {
                None
            };

            let duplicate = statements.iter().any(|s| {
                s.input_links == input_links && s.output_links == output_links && s.and_group == and_group
            });
            if !duplicate {
                statements.push(Statement {
                    id: self.next_id(),
                    input_links,
                    output_links,
                    and_group,
                });
            }
        }
        Ok(statements)
    }

    /// Statements of a `{...}` block body: `;`-separated chains.
    fn block(&mut self, body: &str) -> Result<Vec<Statement>, CompositionError> {
        let mut statements = Vec::new();
        for chain in body.split(';').filter(|c| !c.is_empty()) {
            statements.extend(self.chain(chain)?);
        }
        Ok(statements)
    }

    fn conditional(&mut self, clause: &str) -> Result<Instruction, CompositionError> {
        let mut rest = clause;
        let mut branches = Vec::new();
        let mut otherwise = None;

        loop {
            if let Some(after) = rest.strip_prefix(IF).filter(|_| branches.is_empty()) {
                let (branch, remaining) = self.guarded_block(after)?;
                branches.push(branch);
                rest = remaining;
            } else if let Some(after) = rest.strip_prefix(ELSEIF).filter(|_| !branches.is_empty()) {
                let (branch, remaining) = self.guarded_block(after)?;
                branches.push(branch);
                rest = remaining;
            } else if let Some(after) = rest.strip_prefix(ELSE).filter(|_| !branches.is_empty()) {
                let (body, remaining) = self.enclosed(after, '{', '}')?;
                otherwise = Some(self.block(body)?);
                if !remaining.is_empty() {
                    return Err(self.syntax(format!("unexpected '{}' after else block", remaining)));
                }
                rest = remaining;
            } else if rest.is_empty() {
                break;
            } else {
                return Err(self.syntax(format!("unexpected '{}' in conditional clause", rest)));
            }

            if rest.is_empty() {
                break;
            }
        }

        Ok(Instruction::Conditional { branches, otherwise })
    }

    /// Parse `condition){block}` and return the text after the block.
    fn guarded_block<'t>(&mut self, text: &'t str) -> Result<(Branch, &'t str), CompositionError> {
        let (condition, rest) = self.enclosed(text, '(', ')')?;
        let condition = self.condition(condition)?;
        let rest = rest
            .strip_prefix('{')
            .ok_or_else(|| self.syntax("expected '{' after condition"))?;
        let (body, rest) = self.enclosed(rest, '{', '}')?;
        let statements = self.block(body)?;
        Ok((Branch { condition, statements }, rest))
    }

    /// Split `text` (just after an `open`) at its matching `close`.
    fn enclosed<'t>(&self, text: &'t str, open: char, close: char) -> Result<(&'t str, &'t str), CompositionError> {
        let mut in_literal = false;
        for (i, c) in text.char_indices() {
            match c {
                '"' => in_literal = !in_literal,
                c if c == close && !in_literal => return Ok((&text[..i], &text[i + 1..])),
                c if c == open && !in_literal => {
                    return Err(self.syntax(format!("nested '{}' is not allowed", open)))
                }
                _ => {}
            }
        }
        Err(self.syntax(format!("missing '{}'", close)))
    }

    fn condition(&self, text: &str) -> Result<Condition, CompositionError> {
        let all = split_outside_literals(text, "&&");
        let any = split_outside_literals(text, "||");
        let (junction, parts) = match (all.len() > 1, any.len() > 1) {
            (true, true) => return Err(self.syntax("a condition cannot mix '&&' and '||'")),
            (true, false) => (Junction::All, all),
            (false, true) => (Junction::Any, any),
            (false, false) => (Junction::All, vec![text]),
        };
        let predicates = parts
            .into_iter()
            .map(|part| self.predicate(part))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Condition { predicates, junction })
    }

    fn predicate(&self, text: &str) -> Result<Predicate, CompositionError> {
        let (name, literal, comparison) = if let Some((name, literal)) = split_once_outside_literals(text, "==") {
            (name, literal, Comparison::Equals)
        } else if let Some((name, literal)) = split_once_outside_literals(text, "!=") {
            (name, literal, Comparison::NotEquals)
        } else {
            return Err(self.syntax(format!("'{}' is not a state comparison", text)));
        };

        let state = literal
            .strip_prefix('"')
            .and_then(|l| l.strip_suffix('"'))
            .filter(|s| !s.contains('"'))
            .ok_or_else(|| self.syntax(format!("state '{}' must be a quoted literal", literal)))?;
        let service = CanonicalName::parse_service(name)
            .map_err(|e| self.syntax(format!("invalid service in condition: {}", e)))?;

        Ok(Predicate {
            service,
            comparison,
            state: state.to_string(),
        })
    }
}

fn parse_term(raw: &str, term: &str) -> Result<Term, CompositionError> {
    if term.is_empty() {
        return Err(CompositionError::syntax(raw, "empty term in chain"));
    }
    let (and, names) = match term.strip_prefix('&') {
        Some(rest) => (true, rest),
        None => (false, term),
    };
    let names = names
        .split(',')
        .map(|name| {
            CanonicalName::parse_service(name)
                .map_err(|e| CompositionError::syntax(raw, format!("invalid service name: {}", e)))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Term { and, names })
}

/// Remove whitespace outside string literals.
///
/// Whitespace may separate tokens but never splits one: `c:Up per` is an
/// error, while `else if` is the only pair of words allowed to be apart.
fn strip_whitespace(raw: &str) -> Result<String, CompositionError> {
    let mut text = String::with_capacity(raw.len());
    let mut in_literal = false;
    let mut gap = false;
    for (i, c) in raw.char_indices() {
        if in_literal {
            text.push(c);
            in_literal = c != '"';
            continue;
        }
        if c.is_whitespace() {
            gap = true;
            continue;
        }
        if gap
            && is_name_char(c)
            && text.chars().next_back().is_some_and(is_name_char)
            && !(text.ends_with("else") && raw[i..].starts_with("if"))
        {
            return Err(CompositionError::syntax(raw, format!("whitespace inside a name at byte {}", i)));
        }
        gap = false;
        in_literal = c == '"';
        text.push(c);
    }
    if in_literal {
        return Err(CompositionError::syntax(raw, "unterminated string literal"));
    }
    Ok(text)
}

fn is_name_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '+' | ',' | ';' | '&' | '(' | ')' | '{' | '}' | '=' | '!' | '|' | '"')
}

/// Byte offsets of non-overlapping `pattern` matches outside string literals.
fn find_outside_literals(text: &str, pattern: &str) -> Vec<usize> {
    let mut found: Vec<usize> = Vec::new();
    let mut in_literal = false;
    for (i, c) in text.char_indices() {
        if c == '"' {
            in_literal = !in_literal;
        } else if !in_literal
            && text[i..].starts_with(pattern)
            && found.last().map_or(true, |&last| i >= last + pattern.len())
        {
            found.push(i);
        }
    }
    found
}

fn split_outside_literals<'t>(text: &'t str, pattern: &str) -> Vec<&'t str> {
    let mut parts = Vec::new();
    let mut start = 0;
    for at in find_outside_literals(text, pattern) {
        parts.push(&text[start..at]);
        start = at + pattern.len();
    }
    parts.push(&text[start..]);
    parts
}

fn split_once_outside_literals<'t>(text: &'t str, pattern: &str) -> Option<(&'t str, &'t str)> {
    let at = *find_outside_literals(text, pattern).first()?;
    Some((&text[..at], &text[at + pattern.len()..]))
}

/// Split on `separator` outside braces and literals; checks brace balance.
fn split_top_level<'t>(raw: &str, text: &'t str, separator: char) -> Result<Vec<&'t str>, CompositionError> {
    let mut parts = Vec::new();
    let mut depth: usize = 0;
    let mut in_literal = false;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        match c {
            '"' => in_literal = !in_literal,
            '{' if !in_literal => depth += 1,
            '}' if !in_literal => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| CompositionError::syntax(raw, "unbalanced '}'"))?;
            }
            c if c == separator && depth == 0 && !in_literal => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(CompositionError::syntax(raw, "unbalanced '{'"));
    }
    parts.push(&text[start..]);
    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(engine: &str) -> CanonicalName {
        format!("10.1.1.1_java:C:{}", engine).parse().unwrap()
    }

    fn names(engines: &[&str]) -> BTreeSet<CanonicalName> {
        engines.iter().map(|e| name(e)).collect()
    }

    /// `A+B` -> `10.1.1.1_java:C:A+10.1.1.1_java:C:B`
    fn expand(short: &str) -> String {
        let mut out = String::new();
        let mut token = String::new();
        let mut in_literal = false;
        for c in short.chars() {
            if c == '"' {
                in_literal = !in_literal;
            }
            if !in_literal && c.is_ascii_uppercase() || (!token.is_empty() && c.is_ascii_digit()) {
                token.push(c);
                continue;
            }
            if !token.is_empty() {
                out.push_str(&format!("10.1.1.1_java:C:{}", token));
                token.clear();
            }
            out.push(c);
        }
        if !token.is_empty() {
            out.push_str(&format!("10.1.1.1_java:C:{}", token));
        }
        out
    }

    fn only_statement(compiled: &CompiledComposition) -> &Statement {
        let statements: Vec<_> = compiled.statements().collect();
        assert_eq!(statements.len(), 1, "{:?}", statements);
        statements[0]
    }

    #[test]
    fn test_expand_helper() {
        assert_eq!(
            expand(r#"if(S1=="FOO"){S1+S2}"#),
            r#"if(10.1.1.1_java:C:S1=="FOO"){10.1.1.1_java:C:S1+10.1.1.1_java:C:S2}"#
        );
    }

    #[test]
    fn test_positional_links() {
        let raw = expand("A+B+C+D");

        let b = compile(&raw, &name("B")).unwrap();
        let statement = only_statement(&b);
        assert_eq!(statement.input_links, names(&["A"]));
        assert_eq!(statement.output_links, names(&["C"]));
        assert!(statement.and_group.is_none());

        let d = compile(&raw, &name("D")).unwrap();
        assert!(only_statement(&d).output_links.is_empty());

        let a = compile(&raw, &name("A")).unwrap();
        assert!(only_statement(&a).input_links.is_empty());
    }

    #[test]
    fn test_or_fan_out() {
        let compiled = compile(&expand("A+B+C,D"), &name("B")).unwrap();
        assert_eq!(only_statement(&compiled).output_links, names(&["C", "D"]));
    }

    #[test]
    fn test_and_marker() {
        let compiled = compile(&expand("A,E+&B+C"), &name("B")).unwrap();
        let statement = only_statement(&compiled);
        assert_eq!(statement.input_links, names(&["A", "E"]));
        assert_eq!(statement.and_group, Some(names(&["A", "E"])));
        assert_eq!(statement.output_links, names(&["C"]));
        assert!(compiled.has_and_statements());

        // The marker only matters where the owner sits.
        let compiled = compile(&expand("A,E+&B+C"), &name("A")).unwrap();
        assert!(only_statement(&compiled).and_group.is_none());
    }

    #[test]
    fn test_and_marker_on_chain_head_is_rejected() {
        let err = compile(&expand("&B+C"), &name("B")).unwrap_err();
        assert!(matches!(err, CompositionError::Syntax { .. }));
    }

    #[test]
    fn test_loop_produces_one_statement_per_occurrence() {
        let compiled = compile(&expand("S1+S3+S1"), &name("S3")).unwrap();
        let statement = only_statement(&compiled);
        assert_eq!(statement.input_links, names(&["S1"]));
        assert_eq!(statement.output_links, names(&["S1"]));

        let compiled = compile(&expand("S1+S3+S1"), &name("S1")).unwrap();
        let statements: Vec<_> = compiled.statements().collect();
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].output_links, names(&["S3"]));
        assert_eq!(statements[1].input_links, names(&["S3"]));
        assert!(statements[1].output_links.is_empty());
        assert_eq!(compiled.participants(), &names(&["S1", "S3"]));
    }

    #[test]
    fn test_participants_cover_every_clause() {
        let raw = expand(r#"A+B;C+D;if(B=="X"){B+E}"#);
        let compiled = compile(&raw, &name("B")).unwrap();
        assert_eq!(compiled.participants(), &names(&["A", "B", "C", "D", "E"]));
    }

    #[test]
    fn test_owner_matching_is_structural() {
        let err = compile(&expand("A+S10+B"), &name("S1")).unwrap_err();
        assert!(matches!(err, CompositionError::OwnerNotFound { .. }));
    }

    #[test]
    fn test_irrelevant_clauses_are_dropped() {
        let compiled = compile(&expand("A+B;C+D;B+D"), &name("B")).unwrap();
        assert_eq!(compiled.instructions().len(), 2);
    }

    #[test]
    fn test_conditional_clause() {
        let raw = expand(r#"S1;if(S1=="FOO"){S1+S2}elseif(S1=="BAR"){S1+S3}else{S1+S4}"#);
        let compiled = compile(&raw, &name("S1")).unwrap();
        assert_eq!(compiled.instructions().len(), 2);

        match &compiled.instructions()[1] {
            Instruction::Conditional { branches, otherwise } => {
                assert_eq!(branches.len(), 2);
                assert_eq!(branches[0].condition.predicates[0].state, "FOO");
                assert_eq!(branches[1].statements[0].output_links, names(&["S3"]));
                assert_eq!(otherwise.as_ref().unwrap()[0].output_links, names(&["S4"]));
            }
            other => panic!("expected a conditional instruction, got {:?}", other),
        }
    }

    #[test]
    fn test_conditional_with_whitespace_and_compound_guards() {
        let raw = expand(
            r#"if ( S1 == "A B" && S2 != "X" ) { S1 + S2 ; S1 + S3 } else if (S2 == "Y" || S2 == "Z") { S1 + S4 }"#,
        );
        let compiled = compile(&raw, &name("S1")).unwrap();
        match &compiled.instructions()[0] {
            Instruction::Conditional { branches, otherwise } => {
                assert_eq!(branches[0].condition.junction, Junction::All);
                assert_eq!(branches[0].condition.predicates[0].state, "A B");
                assert_eq!(branches[0].condition.predicates[1].comparison, Comparison::NotEquals);
                assert_eq!(branches[0].statements.len(), 2);
                assert_eq!(branches[1].condition.junction, Junction::Any);
                assert!(otherwise.is_none());
            }
            other => panic!("expected a conditional instruction, got {:?}", other),
        }
    }

    #[test]
    fn test_syntax_errors() {
        let owner = name("S1");
        let cases = [
            ("unbalanced open", r#"if(S1=="A"){S1+S2"#),
            ("unbalanced close", r#"S1+S2}"#),
            ("mixed junctions", r#"if(S1=="A"&&S1=="B"||S1=="C"){S1+S2}"#),
            ("unquoted literal", r#"if(S1==A){S1+S2}"#),
            ("no comparison", r#"if(S1){S1+S2}"#),
            ("else first", r#"else{S1+S2}"#),
            ("trailing after else", r#"if(S1=="A"){S1}else{S1+S2}S3"#),
            ("empty term", "S1++S2"),
            ("unterminated literal", r#"if(S1=="A){S1}"#),
            ("nested block", r#"if(S1=="A"){if(S1=="B"){S1+S2}}"#),
        ];
        for (label, short) in cases {
            let raw = expand(short);
            let err = compile(&raw, &owner).unwrap_err();
            assert!(matches!(err, CompositionError::Syntax { .. }), "{}: {:?}", label, err);
        }

        let err = compile("10.1.1.1_java:C:S1+not a name", &owner).unwrap_err();
        assert!(matches!(err, CompositionError::Syntax { .. }));
        let err = compile("10.1.1.1_java:C:S1+10.1.1.1_java:C", &owner).unwrap_err();
        assert!(matches!(err, CompositionError::Syntax { .. }));
    }

    #[test]
    fn test_operators_inside_literals_are_state_text() {
        let raw = expand(r#"if(S1=="a||b"){S1+S2}elseif(S1!="x==y"&&S2=="p&&q"){S1+S3}"#);
        let compiled = compile(&raw, &name("S1")).unwrap();
        match &compiled.instructions()[0] {
            Instruction::Conditional { branches, .. } => {
                let first = &branches[0].condition;
                assert_eq!(first.predicates.len(), 1);
                assert_eq!(first.predicates[0].state, "a||b");

                let second = &branches[1].condition;
                assert_eq!(second.junction, Junction::All);
                assert_eq!(second.predicates[0].comparison, Comparison::NotEquals);
                assert_eq!(second.predicates[0].state, "x==y");
                assert_eq!(second.predicates[1].service, name("S2"));
                assert_eq!(second.predicates[1].state, "p&&q");
            }
            other => panic!("expected a conditional instruction, got {:?}", other),
        }
    }

    #[test]
    fn test_whitespace_inside_a_name_is_rejected() {
        let owner: CanonicalName = "10.1.1.1_java:c:Upper".parse().unwrap();
        for raw in [
            "10.1.1.1_java:c:Up per",
            "10.1.1.1_java: c:Upper",
            "10.1.1.1_java:c:Upper+10.1.1.1 _java:c:B",
        ] {
            let err = compile(raw, &owner).unwrap_err();
            assert!(matches!(err, CompositionError::Syntax { .. }), "{}: {:?}", raw, err);
        }

        let spaced = compile(" 10.1.1.1_java:c:Upper +\n\t10.1.1.1_java:c:B ; ", &owner).unwrap();
        assert_eq!(spaced.statements().count(), 1);
    }

    #[test]
    fn test_trailing_separator_and_repeat_compiles_are_equal() {
        let raw = expand("A+B+C;");
        let first = compile(&raw, &name("B")).unwrap();
        let second = compile(&raw, &name("B")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_entry_services() {
        assert_eq!(
            entry_services(&expand("A,E+&B+C")).unwrap(),
            vec![name("A"), name("E")]
        );
        assert!(entry_services("").is_err());
        assert!(entry_services(&expand(r#"if(S1=="A"){S1}"#)).is_err());
    }
}
