use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::path::Path;
use regex::Regex;
use thiserror::Error;
#[macro_use]
extern crate lazy_static;

///default file for savefile/loadfile when no path is given
pub const VARS_FILE: &str = "vars.txt";

lazy_static! {
	///names accepted by the save command
	static ref VAR_NAME: Regex = Regex::new("^[a-z]+$").unwrap();
}

/*------------------
	ERROR MODEL
------------------*/

pub type Result<T> = std::result::Result<T, CalcError>;

///every fault the dispatcher absorbs, messages are printed as `Error: ...`
///
///numeric edge cases (division by zero, NaN-producing powers) are NOT faults,
///they propagate through ans as ordinary IEEE-754 values
#[derive(Debug, Error)]
pub enum CalcError {
	#[error("Unknown variable '{0}'.")]
	UnknownVariable(String),
	#[error("Invalid variable name. Use lowercase letters only.")]
	InvalidVariableName,
	#[error("Fibonacci index must be non-negative.")]
	InvalidFibonacciIndex,
	#[error("File not found: {0}")]
	FileNotFound(String),
	#[error("Command '{0}' needs an argument.")]
	MissingArgument(&'static str),
	#[error("{0}")]
	Io(#[from] std::io::Error),
}

/*--------------------
	STATE STORAGE
--------------------*/

///Bundled state storage for one calculator instance
#[derive(Clone, Debug, Default)]
pub struct State {
	///running accumulator ("ans")
	ans: f64,
	///named variables
	vars: HashMap<String, f64>,
	///pre-operation accumulator values, most recent last
	hist: Vec<f64>,
}
impl State {
	///fresh instance: ans = 0, no variables, empty history
	pub fn new() -> Self {
		Self::default()
	}

	#[inline(always)]
	///current accumulator value
	pub fn ans(&self) -> f64 {
		self.ans
	}

	#[inline(always)]
	///record the pre-operation accumulator, called before every undoable mutation
	fn push_undo(&mut self) {
		self.hist.push(self.ans);
	}

	pub fn add(&mut self, x: f64) {
		self.push_undo();
		self.ans += x;
	}

	pub fn subtract(&mut self, x: f64) {
		self.push_undo();
		self.ans -= x;
	}

	pub fn multiply(&mut self, x: f64) {
		self.push_undo();
		self.ans *= x;
	}

	///no zero check, yields ±inf or NaN per IEEE-754
	pub fn divide(&mut self, x: f64) {
		self.push_undo();
		self.ans /= x;
	}

	///floating-point remainder, sign follows the dividend
	pub fn modulo(&mut self, x: f64) {
		self.push_undo();
		self.ans %= x;
	}

	pub fn power(&mut self, x: f64) {
		self.push_undo();
		self.ans = self.ans.powf(x);
	}

	///reset ans to 0 (recorded in the history like any other mutation)
	pub fn clear(&mut self) {
		self.push_undo();
		self.ans = 0.0;
	}

	///restore the most recent pre-operation value, false if the history is empty
	///
	///only the accumulator is reversed, never the variable table
	pub fn undo(&mut self) -> bool {
		if let Some(prev) = self.hist.pop() {
			self.ans = prev;
			true
		}
		else {
			false
		}
	}

	///replace ans with the ans-th Fibonacci number (index truncated toward zero)
	///
	///a negative index faults before anything is recorded, so a failed call
	///leaves the history untouched
	pub fn fibonacci(&mut self) -> Result<()> {
		let n = self.ans as i64;
		if n < 0 {
			return Err(CalcError::InvalidFibonacciIndex);
		}
		self.push_undo();
		self.ans = fib(n);
		Ok(())
	}

	///store ans under a lowercase-letters-only name, overwriting silently
	pub fn save_var(&mut self, name: &str) -> Result<()> {
		if !VAR_NAME.is_match(name) {
			return Err(CalcError::InvalidVariableName);
		}
		self.vars.insert(name.to_string(), self.ans);
		Ok(())
	}

	///recall a variable into ans, recorded in the history
	pub fn load_var(&mut self, name: &str) -> Result<()> {
		let val = self.get_var(name)?;
		self.push_undo();
		self.ans = val;
		Ok(())
	}

	pub fn delete_var(&mut self, name: &str) -> Result<()> {
		if self.vars.remove(name).is_none() {
			return Err(CalcError::UnknownVariable(name.to_string()));
		}
		Ok(())
	}

	///pure read of a stored value
	pub fn get_var(&self, name: &str) -> Result<f64> {
		self.vars.get(name).copied()
			.ok_or_else(|| CalcError::UnknownVariable(name.to_string()))
	}

	///unchecked upsert, bypasses name validation (used by the file loader)
	pub fn set_var(&mut self, name: &str, val: f64) {
		self.vars.insert(name.to_string(), val);
	}

	///saved variable names, iteration order unspecified
	pub fn var_names(&self) -> impl Iterator<Item = &str> {
		self.vars.keys().map(String::as_str)
	}
}

///nth Fibonacci number, F(0)=0 F(1)=1, simple forward loop
fn fib(n: i64) -> f64 {
	if n < 2 {
		return n as f64;
	}
	let (mut a, mut b) = (0.0_f64, 1.0_f64);
	for _ in 2..=n {
		let t = a + b;
		a = b;
		b = t;
	}
	b
}

/*-------------------
	PERSISTENCE
-------------------*/

///writes ans and every variable to a flat key=value file, one entry per line,
///truncating whatever was at the path
pub fn save_vars(path: &str, st: &State) -> Result<()> {
	let mut file = std::fs::File::create(path)?;
	writeln!(file, "ans={}", st.ans)?;
	for (name, val) in &st.vars {
		writeln!(file, "{name}={val}")?;
	}
	log::debug!("saved ans and {} variables to {path}", st.vars.len());
	Ok(())
}

///reads a key=value file back into the state
///
///the `ans` key is committed through the normal undo bookkeeping, every other
///key is an unchecked upsert; lines that don't parse are skipped
pub fn load_vars(path: &str, st: &mut State) -> Result<()> {
	if !Path::new(path).exists() {
		return Err(CalcError::FileNotFound(path.to_string()));
	}
	let mut applied = 0_usize;
	for line in std::fs::read_to_string(path)?.lines() {
		if let Some((key, val)) = line.split_once('=') {
			if let Ok(num) = val.trim().parse::<f64>() {
				if key == "ans" {
					st.clear();
					st.add(num);
				}
				else {
					st.set_var(key, num);
				}
				applied += 1;
			}
		}
	}
	log::debug!("applied {applied} entries from {path}");
	Ok(())
}

/*----------------
	DISPATCH
----------------*/

///all named commands in the dispatch table
#[derive(Clone, Copy)]
enum Cmd {
	Add, Sub, Mul, Div, Mod, Pow,
	Fib, Clear, Undo,
	Save, Load, Delete, Vars,
	SaveFile, LoadFile,
	Help, Exit
}
use Cmd::*;

///command dispatch table, input is lowercased before lookup
static COMMANDS: phf::Map<&'static str, Cmd> = phf::phf_map! {
	"add" => Add,
	"sub" => Sub,
	"mul" => Mul,
	"div" => Div,
	"mod" => Mod,
	"pow" => Pow,
	"fib" => Fib,
	"clear" => Clear,
	"undo" => Undo,
	"save" => Save,
	"load" => Load,
	"delete" => Delete,
	"vars" => Vars,
	"savefile" => SaveFile,
	"loadfile" => LoadFile,
	"help" => Help,
	"exit" => Exit,
};

///in-session command summary
const HELPMSG: &str =
r#"Commands:
	<number>              set ans to that number
	X op Y                evaluate a flat expression, op is one of + - * / %
	add N, sub N, mul N, div N, mod N, pow N
	                      arithmetic on ans, N is a number or a variable
	fib                   replace ans with the ans-th Fibonacci number
	clear                 reset ans to 0
	undo                  revert the last change to ans
	save NAME, load NAME, delete NAME, vars
	                      variable management (lowercase names only)
	savefile [FILE], loadfile [FILE]
	                      persist variables, default file vars.txt
	help                  this summary
	exit                  quit"#;

///Bundle of generic IO streams, for brevity.
pub struct IOTriple<'a> {
	pub input: &'a mut dyn BufRead,
	pub output: &'a mut dyn Write,
	pub error: &'a mut dyn Write
}
#[macro_export]
///Default IO triple using stdin, stdout, stderr
macro_rules! stdio {
	() => {
		::tcalc::IOTriple {
			input: &mut ::std::io::BufReader::new(::std::io::stdin()),
			output: &mut ::std::io::stdout(),
			error: &mut ::std::io::stderr()
		}
	}
}

#[inline(always)]
///token resolver: literal number first, saved variable otherwise
fn resolve(st: &State, token: &str) -> Result<f64> {
	if let Ok(n) = token.parse::<f64>() {
		Ok(n)
	}
	else {
		st.get_var(token)
	}
}

#[inline(always)]
///first argument of a command, or the fault the dispatcher prints
fn arg1<'a>(args: &[&'a str], cmd: &'static str) -> Result<&'a str> {
	args.first().copied().ok_or(CalcError::MissingArgument(cmd))
}

///binary operators accepted by the infix rule
fn infix_op(token: &str) -> Option<fn(f64, f64) -> f64> {
	Some(match token {
		"+" => |l, r| l + r,
		"-" => |l, r| l - r,
		"*" => |l, r| l * r,
		"/" => |l, r| l / r,
		"%" => |l, r| l % r,
		_ => return None
	})
}

///Executes one line of calculator input on the given state, using the provided
///output/error streams.
///
///Recognized forms, in order of precedence:
///- a single token that parses as a number: committed as the new ans
///- `left op right` with op in `+ - * / %`: the flat expression is evaluated
///  and committed, operands may be literals or variable names
///- a named command with optional arguments, matched case-insensitively
///
///Usage of the provided IO streams:
///- output: results (`=> n`), listings and confirmations
///- error: absorbed faults (`Error: ...`) and unknown-command notices
///
///(input is never read here; the interactive loop in [`repl`] owns it)
///
///If the line runs to completion, `Ok(None)` is returned.
///
///`Ok(Some(i32))` indicates an exit request. The caller should terminate with
///that status.
///
///Terminates with `Err` only if a write on an IO stream fails.
pub fn exec(st: &mut State, io: &mut IOTriple, line: &str) -> std::io::Result<Option<i32>> {
	let tokens: Vec<&str> = line.split_whitespace().collect();
	if tokens.is_empty() {
		return Ok(None);
	}

	//bare number: commit as the new ans
	if tokens.len() == 1 {
		if let Ok(n) = tokens[0].parse::<f64>() {
			st.clear();
			st.add(n);
			writeln!(io.output, "=> {}", st.ans())?;
			return Ok(None);
		}
	}

	//flat infix triple
	if tokens.len() == 3 {
		if let Some(op) = infix_op(tokens[1]) {
			match resolve(st, tokens[0]).and_then(|l| resolve(st, tokens[2]).map(|r| op(l, r))) {
				Ok(res) => {
					st.clear();
					st.add(res);
					writeln!(io.output, "=> {}", st.ans())?;
				},
				Err(err) => {
					writeln!(io.error, "Error: {err}")?;
				},
			}
			return Ok(None);
		}
	}

	//named command
	if let Some(cmd) = COMMANDS.get(tokens[0].to_ascii_lowercase().as_str()) {
		match run_cmd(st, io, *cmd, &tokens[1..]) {
			Ok(Some(code)) => {
				return Ok(Some(code));
			},
			Ok(None) => {
				writeln!(io.output, "=> {}", st.ans())?;
			},
			Err(err) => {
				writeln!(io.error, "Error: {err}")?;
			},
		}
	}
	else {
		writeln!(io.error, "Unknown command '{}'. Type 'help'.", tokens[0])?;
	}
	Ok(None)
}

///one dispatch-table command; domain faults bubble up to exec, which prints them
fn run_cmd(st: &mut State, io: &mut IOTriple, cmd: Cmd, args: &[&str]) -> Result<Option<i32>> {
	match cmd {
		Add => {
			let x = resolve(st, arg1(args, "add")?)?;
			st.add(x);
		},
		Sub => {
			let x = resolve(st, arg1(args, "sub")?)?;
			st.subtract(x);
		},
		Mul => {
			let x = resolve(st, arg1(args, "mul")?)?;
			st.multiply(x);
		},
		Div => {
			let x = resolve(st, arg1(args, "div")?)?;
			st.divide(x);
		},
		Mod => {
			let x = resolve(st, arg1(args, "mod")?)?;
			st.modulo(x);
		},
		Pow => {
			let x = resolve(st, arg1(args, "pow")?)?;
			st.power(x);
		},
		Fib => {
			st.fibonacci()?;
		},
		Clear => {
			st.clear();
		},
		Undo => {
			if !st.undo() {
				writeln!(io.output, "Nothing to undo.")?;
			}
		},
		Save => {
			st.save_var(arg1(args, "save")?)?;
		},
		Load => {
			st.load_var(arg1(args, "load")?)?;
		},
		Delete => {
			st.delete_var(arg1(args, "delete")?)?;
		},
		Vars => {
			writeln!(io.output, "Saved variables:")?;
			for (name, val) in &st.vars {
				writeln!(io.output, "{name} = {val}")?;
			}
		},
		SaveFile => {
			let path = args.first().copied().unwrap_or(VARS_FILE);
			save_vars(path, st)?;
			writeln!(io.output, "Variables saved to {path}")?;
		},
		LoadFile => {
			let path = args.first().copied().unwrap_or(VARS_FILE);
			load_vars(path, st)?;
			writeln!(io.output, "Variables loaded from {path}")?;
		},
		Help => {
			writeln!(io.output, "{HELPMSG}")?;
		},
		Exit => {
			return Ok(Some(0));
		},
	}
	Ok(None)
}

///Interactive prompt-eval loop on the given state and streams.
///
///Each iteration prints `ans = <value> > `, reads one line and hands it to
///[`exec`]. Returns the requested status on an explicit exit, or 0 when the
///input stream runs dry (end-of-input ends the session like a clean exit).
pub fn repl(st: &mut State, io: &mut IOTriple) -> std::io::Result<i32> {
	writeln!(io.output, "tcalc - a calculator in a terminal (type 'help' for commands)")?;
	let mut line = String::new();
	loop {
		write!(io.output, "ans = {} > ", st.ans())?;
		io.output.flush()?;
		line.clear();
		if io.input.read_line(&mut line)? == 0 {
			writeln!(io.output)?;
			return Ok(0);
		}
		if let Some(code) = exec(st, io, &line)? {
			return Ok(code);
		}
	}
}
