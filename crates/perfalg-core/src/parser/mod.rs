//! Algorithm text to sequence tree.
//!
//! Grammar:
//!
//! ```text
//! A B(params) -C          tasks; `-` excludes the next task from counts
//! { ... }  [ ... ]        serial / parallel sequence
//! { "label" ... }         labeled sequence
//! }:N  }:Ns  }:*          repeat N times / for N seconds / until exhausted
//! }:N::R  }:N::R/min      rate limit, per second by default
//! }>  }:N>                children do not report statistics
//! Add:3                   same as { Add }:3
//! # ...                   comment to end of line
//! ```

mod cursor;
use cursor::{Cursor, Pos};

use std::{sync::Arc, time::Duration};

use perfalg_model::{Concurrency, Rate, RateUnit, Repetition};

use crate::{
    error::{GrammarError, TaskError},
    node::Node,
    registry::TaskRegistry,
    run::RunData,
    sequence::Sequence,
    task::TaskNode,
};

/// Parse algorithm text into its root sequence.
///
/// Redundant unlabeled outer sequences are collapsed.
pub fn parse(
    text: &str,
    registry: &TaskRegistry,
    run: &Arc<RunData>,
) -> Result<Sequence, GrammarError> {
    Parser::new(text, registry, run).parse()
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

struct Parser<'a> {
    cursor: Cursor<'a>,
    registry: &'a TaskRegistry,
    run: &'a Arc<RunData>,
    /// Open sequences with the position of their opening delimiter.
    stack: Vec<(Sequence, Pos)>,
    disable_next: Option<Pos>,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str, registry: &'a TaskRegistry, run: &'a Arc<RunData>) -> Self {
        let root = Sequence::serial(Arc::clone(run));
        let cursor = Cursor::new(text);
        let origin = cursor.pos();
        Self {
            cursor,
            registry,
            run,
            stack: vec![(root, origin)],
            disable_next: None,
        }
    }

    fn parse(mut self) -> Result<Sequence, GrammarError> {
        loop {
            self.cursor.skip_trivia();
            let pos = self.cursor.pos();
            let Some(c) = self.cursor.peek() else { break };

            if let Some(dash) = self.disable_next
                && !is_word_char(c)
            {
                return Err(self.cursor.error_at(dash, "'-' must precede a task name"));
            }

            match c {
                '{' | '[' => {
                    self.cursor.bump();
                    let concurrency = if c == '[' {
                        Concurrency::Parallel
                    } else {
                        Concurrency::Serial
                    };
                    let label = self.label()?;
                    let seq = Sequence::new(Arc::clone(self.run), label, concurrency);
                    self.stack.push((seq, pos));
                }
                '}' | ']' => {
                    self.cursor.bump();
                    self.close(c, pos)?;
                    self.modifiers()?;
                }
                '-' => {
                    self.cursor.bump();
                    self.disable_next = Some(pos);
                }
                c if is_word_char(c) => {
                    self.task(pos)?;
                    self.modifiers()?;
                }
                ':' => {
                    return Err(self
                        .cursor
                        .error_at(pos, "modifier without a preceding task or sequence"));
                }
                '>' => {
                    return Err(self
                        .cursor
                        .error_at(pos, "'>' must follow a closing delimiter"));
                }
                '"' => {
                    return Err(self
                        .cursor
                        .error_at(pos, "label must follow an opening delimiter"));
                }
                other => {
                    return Err(self
                        .cursor
                        .error_at(pos, format!("unexpected character {other:?}")));
                }
            }
        }

        if let Some(dash) = self.disable_next {
            return Err(self.cursor.error_at(dash, "'-' must precede a task name"));
        }
        if self.stack.len() > 1 {
            let open = self.stack[self.stack.len() - 1].1;
            return Err(self.cursor.error_at(open, "unmatched opening delimiter"));
        }

        let (root, _) = self
            .stack
            .pop()
            .ok_or_else(|| self.cursor.error_at(self.cursor.pos(), "empty parser stack"))?;
        Ok(collapse(root))
    }

    /// Optional `"label"` right after an opening delimiter.
    fn label(&mut self) -> Result<Option<String>, GrammarError> {
        self.cursor.skip_trivia();
        let pos = self.cursor.pos();
        if !self.cursor.eat('"') {
            return Ok(None);
        }
        let label = self.cursor.eat_while(|c| c != '"' && c != '\n');
        if !self.cursor.eat('"') {
            return Err(self.cursor.error_at(pos, "unterminated sequence label"));
        }
        if label.trim().is_empty() {
            return Err(self.cursor.error_at(pos, "empty sequence label"));
        }
        Ok(Some(label.to_string()))
    }

    fn close(&mut self, delim: char, pos: Pos) -> Result<(), GrammarError> {
        if self.stack.len() < 2 {
            return Err(self.cursor.error_at(pos, "unmatched closing delimiter"));
        }
        let expected = self.top().concurrency().close();
        if delim != expected {
            return Err(self.cursor.error_at(
                pos,
                format!("expected {expected:?} to close the sequence, found {delim:?}"),
            ));
        }
        if let Some((seq, _)) = self.stack.pop() {
            self.top().push(seq);
        }
        Ok(())
    }

    fn task(&mut self, pos: Pos) -> Result<(), GrammarError> {
        let word = self.cursor.eat_while(is_word_char);
        let params = if self.cursor.peek() == Some('(') {
            Some(self.params()?)
        } else {
            None
        };

        let task = self
            .registry
            .create(word, self.run)
            .ok_or_else(|| self.cursor.error_at(pos, format!("unknown task {word:?}")))?;
        let mut node = TaskNode::new(task, Arc::clone(self.run));
        node.set_disable_counting(self.disable_next.take().is_some());

        if let Some(params) = params.filter(|p| !p.is_empty()) {
            node.set_params(&params).map_err(|e| {
                let message = match e {
                    TaskError::InvalidParams { task, reason } => {
                        format!("bad parameters for {task}: {reason}")
                    }
                    other => format!("bad parameters for {word}: {other}"),
                };
                self.cursor.error_at(pos, message)
            })?;
        }

        self.top().push(node);
        Ok(())
    }

    /// Balanced `( ... )` span; returns the trimmed inner text.
    fn params(&mut self) -> Result<String, GrammarError> {
        let open = self.cursor.pos();
        self.cursor.bump();
        let mut depth = 1usize;
        let mut text = String::new();
        while let Some(c) = self.cursor.bump() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(text.trim().to_string());
                    }
                }
                _ => {}
            }
            text.push(c);
        }
        Err(self.cursor.error_at(open, "unterminated parameter list"))
    }

    /// Modifiers after a closing delimiter or a task: repetition, rate, then `>`.
    fn modifiers(&mut self) -> Result<(), GrammarError> {
        self.cursor.skip_trivia();
        let pos = self.cursor.pos();
        let mut repeated = false;

        if self.cursor.peek() == Some(':') && self.cursor.peek_nth(1) != Some(':') {
            self.cursor.bump();
            let repetition = self.repetition()?;
            let target = self.target(pos)?;
            check_repetition(target, repetition).map_err(|m| self.cursor.error_at(pos, m))?;
            self.forever_check(repetition, pos)?;
            self.target(pos)?.set_repetition(repetition);
            repeated = true;
        }

        if self.cursor.peek() == Some(':') && self.cursor.peek_nth(1) == Some(':') {
            let rate_pos = self.cursor.pos();
            if !repeated {
                return Err(self
                    .cursor
                    .error_at(rate_pos, "rate requires a preceding repetition"));
            }
            self.cursor.bump();
            self.cursor.bump();
            let rate = self.rate()?;
            self.target(pos)?.set_rate(rate);
        }

        if self.cursor.peek() == Some('>') {
            let gt = self.cursor.pos();
            self.cursor.bump();
            if !repeated && self.last_is_task() {
                return Err(self.cursor.error_at(gt, "'>' must follow a closing delimiter"));
            }
            self.target(gt)?.set_no_child_report();
        }

        self.cursor.skip_trivia();
        if self.cursor.peek() == Some(':') {
            let again = self.cursor.pos();
            return Err(self.cursor.error_at(again, "repetition already set"));
        }
        Ok(())
    }

    fn repetition(&mut self) -> Result<Repetition, GrammarError> {
        let pos = self.cursor.pos();
        if self.cursor.eat('*') {
            return Ok(Repetition::UntilExhausted);
        }

        let digits = self.cursor.eat_while(|c| c.is_ascii_digit() || c == '.');
        if digits.is_empty() {
            return Err(self
                .cursor
                .error_at(pos, "expected repetition count, duration or '*'"));
        }

        if self.cursor.peek() == Some('s') && !self.cursor.peek_nth(1).is_some_and(is_word_char) {
            self.cursor.bump();
            return parse_secs(digits)
                .map(Repetition::For)
                .ok_or_else(|| self.cursor.error_at(pos, format!("invalid duration {digits:?}")));
        }

        let n: u32 = digits.parse().map_err(|_| {
            self.cursor
                .error_at(pos, format!("invalid repetition count {digits:?}"))
        })?;
        Ok(Repetition::Count(n))
    }

    fn rate(&mut self) -> Result<Rate, GrammarError> {
        let pos = self.cursor.pos();
        let digits = self.cursor.eat_while(|c| c.is_ascii_digit());
        let ops: u32 = digits
            .parse()
            .map_err(|_| self.cursor.error_at(pos, "expected rate number"))?;
        if ops == 0 {
            return Err(self.cursor.error_at(pos, "rate must be greater than zero"));
        }

        let unit = if self.cursor.eat('/') {
            let unit_pos = self.cursor.pos();
            match self
                .cursor
                .eat_while(|c| c.is_ascii_alphabetic())
                .to_ascii_lowercase()
                .as_str()
            {
                "sec" => RateUnit::Sec,
                "min" => RateUnit::Min,
                _ => {
                    return Err(self
                        .cursor
                        .error_at(unit_pos, "expected rate unit 'sec' or 'min'"));
                }
            }
        } else {
            RateUnit::Sec
        };
        Ok(Rate::new(ops, unit))
    }

    fn forever_check(&self, repetition: Repetition, pos: Pos) -> Result<(), GrammarError> {
        if !repetition.is_until_exhausted() {
            return Ok(());
        }
        let forever = self
            .run
            .config()
            .get_bool("content.source.forever", true)
            .map_err(|e| self.cursor.error_at(pos, e.to_string()))?;
        if forever {
            return Err(self.cursor.error_at(
                pos,
                "':*' never ends while content.source.forever is true",
            ));
        }
        Ok(())
    }

    fn last_is_task(&self) -> bool {
        self.stack
            .last()
            .and_then(|(s, _)| s.children().last())
            .is_some_and(|n| n.as_task().is_some())
    }

    /// Sequence the modifiers apply to. A bare task is wrapped in a serial sequence first.
    fn target(&mut self, pos: Pos) -> Result<&mut Sequence, GrammarError> {
        let run = Arc::clone(self.run);
        let top = self.top();
        let Some(last) = top.children_mut().pop() else {
            return Err(self
                .cursor
                .error_at(pos, "modifier without a preceding task or sequence"));
        };
        let node = match last {
            Node::Task(t) => {
                let mut wrapper = Sequence::serial(run);
                wrapper.push(t);
                Node::Sequence(wrapper)
            }
            seq => seq,
        };
        let top = self.top();
        top.push(node);
        top.children_mut()
            .last_mut()
            .and_then(Node::as_sequence_mut)
            .ok_or_else(|| unreachable_target(pos))
    }

    fn top(&mut self) -> &mut Sequence {
        // The root never leaves the stack before parsing ends.
        let last = self.stack.len() - 1;
        &mut self.stack[last].0
    }
}

/// Decimal seconds read exactly; digits past nanoseconds are dropped.
fn parse_secs(text: &str) -> Option<Duration> {
    let (whole, frac) = text.split_once('.').unwrap_or((text, ""));
    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let secs = if whole.is_empty() { 0 } else { whole.parse::<u64>().ok()? };
    let digits = frac.len().min(9);
    let nanos = frac.bytes().take(9).fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0'));
    Some(Duration::new(secs, nanos * 10u32.pow(9 - digits as u32)))
}

fn unreachable_target(pos: Pos) -> GrammarError {
    GrammarError {
        message: "modifier target is not a sequence".to_string(),
        line: pos.line,
        column: pos.column,
        near: String::new(),
    }
}

fn check_repetition(target: &Sequence, repetition: Repetition) -> Result<(), String> {
    if !target.concurrency().is_parallel() {
        return Ok(());
    }
    match repetition {
        Repetition::UntilExhausted => Err("':*' is not allowed on a parallel sequence".into()),
        Repetition::For(_) => Err("a duration is not allowed on a parallel sequence".into()),
        Repetition::Count(_) => Ok(()),
    }
}

/// Replace an unlabeled plain root with its single child sequence, repeatedly.
fn collapse(mut root: Sequence) -> Sequence {
    while root.is_collapsible()
        && root.is_plain()
        && root.children().len() == 1
        && root.children()[0].as_sequence().is_some()
    {
        match root.children_mut().pop() {
            Some(Node::Sequence(child)) => root = child,
            _ => break,
        }
    }
    root.set_depth(0);
    root
}

#[cfg(test)]
mod tests;
