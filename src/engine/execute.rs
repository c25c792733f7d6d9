//! The fetch-decode-execute loop.
//!
//! A single program counter walks the accepted lines. Every step decodes the
//! line at `pc`, dispatches it exactly once, and then moves the counter: to
//! the jump target when the dispatch produced one, to `pc + 1` otherwise.
//! Jump targets always wrap over the program length with true modulo, so a
//! run only ends when the counter walks off the end of the program.

use crate::engine::decode::{decode_line, decode_line_traced, DecodedLine, Opcode};
use crate::engine::memory::{Memory, MemoryError};
use crate::engine::output::OutputHandler;
use crate::program::Program;
use serde::{Deserialize, Serialize};
use std::io::Write;
use thiserror::Error;

/// The execution engine for one program run.
///
/// Owns the tape and the output sink; the program is borrowed per call, so a
/// host can run the same program again after a [`reset`](Engine::reset).
pub struct Engine<W> {
    mem: Memory,
    pc: usize,
    steps: u64,
    output: OutputHandler<W>,
    trace: Option<Box<dyn Write>>,
}

impl<W: Write> Engine<W> {
    /// Engine with a default-size tape writing to `sink`.
    pub fn new(sink: W) -> Self {
        Self::with_memory(Memory::new(), sink)
    }

    /// Engine over an existing tape, e.g. one with a custom size.
    pub fn with_memory(mem: Memory, sink: W) -> Self {
        Self {
            mem,
            pc: 0,
            steps: 0,
            output: OutputHandler::new(sink),
            trace: None,
        }
    }

    /// Route a line-by-line decode trace to `channel`. Tracing never changes
    /// operand values or instruction effects.
    pub fn set_trace(&mut self, channel: Box<dyn Write>) {
        self.trace = Some(channel);
    }

    /// Turn the diagnostic trace off.
    pub fn clear_trace(&mut self) {
        self.trace = None;
    }

    pub fn memory(&self) -> &Memory {
        &self.mem
    }

    /// Borrow the output sink, e.g. to inspect captured output.
    pub fn sink(&self) -> &W {
        self.output.sink()
    }

    /// Consume the engine and hand back the output sink.
    pub fn into_sink(self) -> W {
        self.output.into_inner()
    }

    /// Mutable tape access, for hosts that preload cells before a run.
    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.mem
    }

    /// Current program counter.
    pub fn pc(&self) -> usize {
        self.pc
    }

    /// Instructions dispatched so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Reset counter, step count and tape for a fresh run.
    pub fn reset(&mut self) {
        self.pc = 0;
        self.steps = 0;
        self.mem.clear();
    }

    /// Serializable state of the engine: tape, counter, step count.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            memory: self.mem.clone(),
            pc: self.pc,
            steps: self.steps,
        }
    }

    /// Run the program until the counter walks off the end.
    ///
    /// An empty program terminates immediately as a no-op. A program whose
    /// jumps never let the counter reach the end runs forever; that is
    /// language behavior, not an error — hosts that need a bound use
    /// [`run_limited`](Engine::run_limited).
    ///
    /// Returns the number of instructions dispatched by this call.
    pub fn run(&mut self, program: &Program) -> Result<u64, EngineError> {
        let start = self.steps;

        while self.pc < program.len() {
            self.step(program)?;
        }

        Ok(self.steps - start)
    }

    /// Run at most `max_steps` instructions.
    pub fn run_limited(&mut self, program: &Program, max_steps: u64) -> Result<u64, EngineError> {
        let start = self.steps;
        let limit = self.steps + max_steps;

        while self.pc < program.len() && self.steps < limit {
            self.step(program)?;
        }

        Ok(self.steps - start)
    }

    /// Decode and dispatch the line at `pc`, then move the counter.
    pub fn step(&mut self, program: &Program) -> Result<(), EngineError> {
        let line = program
            .line(self.pc)
            .ok_or(EngineError::CounterOutOfRange {
                pc: self.pc,
                len: program.len(),
            })?;

        let decoded = if let Some(channel) = self.trace.as_mut() {
            let (decoded, trace) = decode_line_traced(line);
            write!(channel, "{:>4}:", self.pc)?;
            for t in &trace {
                write!(channel, " {}({:+})", t.token, t.contribution)?;
            }
            writeln!(channel, " -> {:?} operand={}", decoded.opcode, decoded.operand)?;
            decoded
        } else {
            decode_line(line)
        };

        let target = self.dispatch(decoded, program.len())?;
        self.pc = match target {
            Some(jump) => jump,
            None => self.pc + 1,
        };
        self.steps += 1;

        Ok(())
    }

    /// Apply one decoded instruction. Returns the jump target when the
    /// instruction redirects control flow, `None` for the default advance.
    fn dispatch(&mut self, decoded: DecodedLine, len: usize) -> Result<Option<usize>, EngineError> {
        let DecodedLine { opcode, operand } = decoded;

        let target = match opcode {
            // ==================== Memory ====================
            Opcode::Add => {
                let current = self.mem.current_byte() as i32;
                self.mem.set_current_byte(current + operand);
                None
            }
            Opcode::Subtract => {
                let current = self.mem.current_byte() as i32;
                self.mem.set_current_byte(current - operand);
                None
            }
            Opcode::Set => {
                self.mem.set_current_byte(operand);
                None
            }
            Opcode::MovePointerTo => {
                self.mem.set_pointer(operand);
                None
            }
            Opcode::MovePointerForward => {
                self.mem.increment_pointer();
                None
            }
            Opcode::MovePointerBack => {
                self.mem.decrement_pointer();
                None
            }

            // ==================== Control flow ====================
            Opcode::JumpTo => Some(wrap(operand, len)),
            Opcode::JumpIfZero => {
                if self.mem.current_byte() == 0 {
                    Some(wrap(operand, len))
                } else {
                    None
                }
            }
            Opcode::JumpIfNotZero => {
                if self.mem.current_byte() != 0 {
                    Some(wrap(operand, len))
                } else {
                    None
                }
            }
            Opcode::JumpBack => Some(wrap(self.pc as i32 - operand, len)),
            Opcode::JumpForward => Some(wrap(self.pc as i32 + operand, len)),

            // ==================== Output ====================
            Opcode::PrintAsciiAt => {
                self.print_at(operand, true)?;
                None
            }
            Opcode::PrintValueAt => {
                self.print_at(operand, false)?;
                None
            }
            Opcode::PrintAscii => {
                self.output.print_ascii(self.mem.current_byte())?;
                None
            }
            Opcode::PrintValue => {
                self.output.print_value(self.mem.current_byte())?;
                None
            }
            Opcode::PrintAsciiTable => {
                self.output.print_ascii_table(&self.mem)?;
                None
            }
            Opcode::PrintValueTable => {
                self.output.print_value_table(&self.mem)?;
                None
            }

            Opcode::Unspecified => {
                if let Some(channel) = self.trace.as_mut() {
                    writeln!(channel, "      unknown instruction, ignoring")?;
                }
                None
            }
        };

        Ok(target)
    }

    /// Print the cell at a direct address. An address outside the tape skips
    /// the print; diagnostic mode reports it.
    fn print_at(&mut self, addr: i32, as_ascii: bool) -> Result<(), EngineError> {
        match self.mem.byte_at(addr) {
            Ok(byte) => {
                if as_ascii {
                    self.output.print_ascii(byte)?;
                } else {
                    self.output.print_value(byte)?;
                }
            }
            Err(err) => {
                if let Some(channel) = self.trace.as_mut() {
                    writeln!(channel, "      skipped print: {}", err)?;
                }
            }
        }
        Ok(())
    }
}

impl<W> std::fmt::Debug for Engine<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("pc", &self.pc)
            .field("steps", &self.steps)
            .field("mem", &self.mem)
            .field("tracing", &self.trace.is_some())
            .finish()
    }
}

/// True mathematical modulo onto `[0, len)`.
///
/// `len` is never zero here: the run loop returns before dispatching
/// anything on an empty program.
fn wrap(value: i32, len: usize) -> usize {
    (value as i64).rem_euclid(len as i64) as usize
}

/// Serializable engine state, e.g. for a host dumping the final tape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub memory: Memory,
    pub pc: usize,
    pub steps: u64,
}

/// Errors that can occur during execution.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("program counter {pc} out of range for {len} lines")]
    CounterOutOfRange { pc: usize, len: usize },

    #[error("memory error: {0}")]
    Memory(#[from] MemoryError),

    #[error("output error: {0}")]
    Output(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lex::WordDictionary;
    use crate::program::Loader;
    use std::cell::RefCell;
    use std::io;
    use std::rc::Rc;

    /// Build a program whose dictionary is exactly its own words, so every
    /// line is accepted.
    fn load(lines: &[&str]) -> Program {
        let text = lines.join("\n");
        let dict = WordDictionary::from_words(text.split_whitespace());
        Loader::new(&dict).load(&text)
    }

    fn run_with_memory(lines: &[&str], size: usize) -> (Vec<u8>, Engine<Vec<u8>>) {
        let program = load(lines);
        let mut engine = Engine::with_memory(Memory::with_size(size), Vec::new());
        engine.run(&program).unwrap();
        let output = engine.sink().clone();
        (output, engine)
    }

    fn run_output(lines: &[&str], size: usize) -> Vec<u8> {
        run_with_memory(lines, size).0
    }

    #[test]
    fn test_empty_program_is_a_no_op() {
        let program = load(&[]);
        let mut engine = Engine::new(Vec::new());
        assert_eq!(engine.run(&program).unwrap(), 0);
    }

    #[test]
    fn test_set_then_print_value() {
        // cat -> Set 24; s -> PrintValue
        assert_eq!(run_output(&["cat", "s"], 4), b"24\n");
    }

    #[test]
    fn test_set_truncates_to_byte() {
        // zzzzzzzzzz has value 260 and even length: Set 3 + 260 = 263 -> 7
        assert_eq!(run_output(&["c zzzzzzzzzz", "s"], 4), b"7\n");
    }

    #[test]
    fn test_subtract_wraps_mod_256() {
        // c -> Set 3; "b to" -> Subtract 2 + 35 = 37; 3 - 37 = -34 -> 222
        assert_eq!(run_output(&["c", "b to", "s"], 4), b"222\n");
    }

    #[test]
    fn test_add_accumulates() {
        // cat -> Set 24; add -> Add 9; add -> Add 9
        assert_eq!(run_output(&["cat", "add", "add", "s"], 4), b"42\n");
    }

    #[test]
    fn test_pointer_moves() {
        // f -> forward; c -> Set 3 at cell 1; s -> 3; g -> back; s -> 0
        assert_eq!(run_output(&["f", "c", "s", "g", "s"], 4), b"3\n0\n");
    }

    #[test]
    fn test_move_pointer_to_wraps_over_size() {
        // "e zz" -> MovePointerTo 5 + 52 = 57; 57 mod 4 = 1
        let (output, engine) = run_with_memory(&["e zz", "c", "w"], 4);
        assert_eq!(engine.memory().pointer(), 1);
        assert_eq!(output, b"0 3 0 0 \n");
    }

    #[test]
    fn test_jump_to_wraps_with_true_modulo() {
        // "j banana" -> operand 10 + 33 = 43; 43 mod 3 = 1
        let program = load(&["j banana", "c", "s"]);
        let mut engine = Engine::with_memory(Memory::with_size(4), Vec::new());
        engine.step(&program).unwrap();
        assert_eq!(engine.pc(), 1);

        // "j zzz" -> operand 10 - 78 = -68; -68 mod 3 = 1
        let program = load(&["j zzz", "c", "s"]);
        let mut engine = Engine::with_memory(Memory::with_size(4), Vec::new());
        engine.step(&program).unwrap();
        assert_eq!(engine.pc(), 1);
    }

    #[test]
    fn test_jump_if_zero_taken_on_zero_cell() {
        // "k i" -> operand 11 - 9 = 2: skip the Set, print the untouched 0.
        assert_eq!(run_output(&["k i", "c", "s"], 4), b"0\n");
    }

    #[test]
    fn test_jump_if_zero_not_taken_on_nonzero_cell() {
        // cell is 3, so the conditional falls through to the Subtract.
        // "k h" -> 11 - 8 = 3, which would jump straight to the print.
        assert_eq!(run_output(&["c", "k h", "b a", "s"], 4), b"2\n");
    }

    #[test]
    fn test_jump_if_not_zero() {
        // c -> Set 3; "l i" -> operand 3; 3 mod 4 = 3: jump to the print.
        assert_eq!(run_output(&["c", "l i", "c", "s"], 4), b"3\n");
        // Zero cell: no jump, fall through.
        assert_eq!(run_output(&["l i", "s"], 4), b"0\n");
    }

    #[test]
    fn test_jump_back_wraps_below_zero() {
        // At pc 1, "m b" -> operand 13 - 2 = 11; (1 - 11) mod 3 = 2.
        let (output, engine) = run_with_memory(&["c", "m b", "s"], 4);
        assert_eq!(output, b"3\n");
        assert_eq!(engine.steps(), 3);
    }

    #[test]
    fn test_jump_forward_wraps_over_length() {
        // "n i" -> operand 14 - 9 = 5; (0 + 5) mod 3 = 2: skip the Set.
        assert_eq!(run_output(&["n i", "c", "s"], 4), b"0\n");
    }

    #[test]
    fn test_set_and_jump_loop_runs_forever() {
        // "c j" -> Set 3 - 10 = -7 -> 249; "j a" -> JumpTo 9 mod 2 = 1.
        let dict = WordDictionary::from_words(["c", "j", "a"]);
        let program = Loader::new(&dict).load("c j\nj a");
        assert_eq!(program.len(), 2);

        let mut engine = Engine::with_memory(Memory::with_size(4), Vec::new());
        let steps = engine.run_limited(&program, 1000).unwrap();

        assert_eq!(steps, 1000);
        assert!(engine.pc() < program.len());
        assert_eq!(engine.memory().byte_at(0).unwrap(), 249);
    }

    #[test]
    fn test_print_value_table_on_zeroed_tape() {
        assert_eq!(run_output(&["w"], 4), b"0 0 0 0 \n");
    }

    #[test]
    fn test_print_ascii_table() {
        // czzq -> Set 72 'H'; f; czzzx -> Set 105 'i'; v
        assert_eq!(run_output(&["czzq", "f", "czzzx", "v"], 4), b"Hi\x00\x00\n");
    }

    #[test]
    fn test_print_at_direct_address() {
        // "q m" -> PrintValueAt 17 - 13 = 4... out of range on a 4-cell tape
        assert_eq!(run_output(&["q m"], 4), b"");
        // In range on a larger tape.
        assert_eq!(run_output(&["q m"], 8), b"0\n");
    }

    #[test]
    fn test_print_at_out_of_range_is_skipped() {
        // "p zzzz" -> operand 16 + 104 = 120, outside a 4-cell tape.
        assert_eq!(run_output(&["p zzzz"], 4), b"");
        // Negative address: "p zza" -> 16 - 53 = -37.
        assert_eq!(run_output(&["p zza"], 4), b"");
    }

    #[test]
    fn test_unreserved_leading_letter_is_a_no_op() {
        let (output, engine) = run_with_memory(&["dog", "s"], 4);
        assert_eq!(output, b"0\n");
        assert_eq!(engine.steps(), 2);
    }

    #[test]
    fn test_reset_clears_tape_and_counters() {
        let program = load(&["cat"]);
        let mut engine = Engine::with_memory(Memory::with_size(4), Vec::new());
        engine.run(&program).unwrap();
        assert_eq!(engine.memory().current_byte(), 24);

        engine.reset();
        assert_eq!(engine.pc(), 0);
        assert_eq!(engine.steps(), 0);
        assert_eq!(engine.memory().current_byte(), 0);
    }

    /// A sink that appends into a shared buffer, so a test can keep reading
    /// it after handing the writer to the engine.
    #[derive(Clone, Default)]
    struct SharedBuf(Rc<RefCell<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_trace_does_not_change_output_or_memory() {
        let lines = ["cat", "add", "f", "c", "s", "w", "dog"];
        let program = load(&lines);

        let mut silent = Engine::with_memory(Memory::with_size(4), Vec::new());
        silent.run(&program).unwrap();

        let trace = SharedBuf::default();
        let mut traced = Engine::with_memory(Memory::with_size(4), Vec::new());
        traced.set_trace(Box::new(trace.clone()));
        traced.run(&program).unwrap();

        assert_eq!(silent.sink(), traced.sink());
        assert_eq!(silent.memory().cells(), traced.memory().cells());
        assert_eq!(silent.memory().pointer(), traced.memory().pointer());
        assert!(!trace.0.borrow().is_empty());
    }

    #[test]
    fn test_step_past_the_end_is_an_error() {
        let program = load(&["cat"]);
        let mut engine = Engine::new(Vec::new());
        engine.step(&program).unwrap();
        assert!(matches!(
            engine.step(&program),
            Err(EngineError::CounterOutOfRange { pc: 1, len: 1 })
        ));
    }
}
