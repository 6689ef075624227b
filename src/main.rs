use tcalc::{exec, repl, stdio, IOTriple, State};

///command line help
const USAGE: &str =
r#"tcalc - a calculator in a terminal

Maintains a running accumulator ("ans"), applies arithmetic to it, stores and
recalls named variables, undoes the last change, computes Fibonacci numbers
and persists variables to a text file. Type 'help' inside a session for the
command summary.

Command line options:
(order/position of --flags doesn't matter)

<nothing>
	Defaults to "-i".

--inter|-i
	Interactive mode, standard prompt-eval loop.

--expr|-e [--inter|-i] EXPR1 [EXPR2] [EXPR3] ...
	Expression mode, executes each expression as one line of input. If combined with -i, enters interactive mode afterwards.

[--file|-f] [--inter|-i] FILE1 [FILE2] [FILE3] ...
	File mode, executes the lines of each file in order. For each line, comments (following the first #) are removed before execution.
	-f is optional: If at least one option is provided without any --flags, file mode is implied.

--help|-h
	Ignores all other options and prints this help message."#;

fn main() {
	pretty_env_logger::init();

	//parse options
	let (mut i, mut e, mut f, mut h) = (false, false, false, false);
	let mut names: Vec<String> = Vec::new();
	let args: Vec<String> = std::env::args().skip(1).collect();	//get args, skip name of binary
	if args.is_empty() {i=true};	//default to interactive
	for arg in args {
		if let Some(flag) = arg.strip_prefix("--") {	//long option
			match flag {
				"inter" => {i=true;}
				"expr" => {e=true;}
				"file" => {f=true;}
				"help" => {h=true;}
				_ => {
					eprintln!("! Unrecognized option: --{flag}, use -h for help");
					std::process::exit(0);
				}
			}
			continue;
		}
		if arg.starts_with('-') {	//short option, multiple at once possible
			for flag in arg.chars() {
				match flag {
					'-' => {}	//allow -f-i or similar
					'i' => {i=true;}
					'e' => {e=true;}
					'f' => {f=true;}
					'h' => {h=true;}
					_ => {
						eprintln!("! Unrecognized option: -{flag}, use -h for help");
						std::process::exit(0);
					}
				}
			}
			continue;
		}
		names.push(arg);
	}

	if h {	//always exits
		println!("{USAGE}");
		std::process::exit(0);
	}

	let mut st = State::new();
	let mut io = stdio!();
	let res = match (i, e, f) {
		(false, false, false) => {file_mode(&mut st, &mut io, names, false)}	//no flags: assume filenames
		(true, false, false) if names.is_empty() => {interactive_mode(&mut st, &mut io)}	//normal interactive
		(true, false, false) => {file_mode(&mut st, &mut io, names, true)}	//-i with filenames: file mode, inter after
		(_, true, false) => {expression_mode(&mut st, &mut io, names, i)}	//expr mode, pass i on
		(_, false, true) => {file_mode(&mut st, &mut io, names, i)}	//file mode, pass i on
		(_, true, true) => {
			eprintln!("! Invalid options: both -e and -f present");
			Ok(())
		}
	};
	if let Err(err) = res {
		eprintln!("! Terminal IO failure: {err}");
		std::process::exit(1);
	}
}

fn interactive_mode(st: &mut State, io: &mut IOTriple) -> std::io::Result<()> {
	std::process::exit(repl(st, io)?);
}

fn expression_mode(st: &mut State, io: &mut IOTriple, exprs: Vec<String>, inter: bool) -> std::io::Result<()> {
	if exprs.is_empty() {
		eprintln!("! No expression provided");
	}
	else {
		for expr in exprs {
			if let Some(code) = exec(st, io, &expr)? {
				std::process::exit(code);
			}
		}
	}
	if inter {
		interactive_mode(st, io)?;
	}
	Ok(())
}

fn file_mode(st: &mut State, io: &mut IOTriple, files: Vec<String>, inter: bool) -> std::io::Result<()> {
	if files.is_empty() {
		eprintln!("! No file name provided");
	}
	else {
		for file in files {
			match std::fs::read_to_string(&file) {
				Ok(script) => {
					log::debug!("executing script {file}");
					for line in script.lines() {
						let line = line.split_once('#').map_or(line, |(text, _)| text);	//remove comment
						if let Some(code) = exec(st, io, line)? {
							std::process::exit(code);
						}
					}
				},
				Err(err) => {
					eprintln!("! Unable to read file \"{file}\": {err}");
				},
			}
		}
	}
	if inter {
		interactive_mode(st, io)?;
	}
	Ok(())
}
