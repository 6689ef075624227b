#[allow(dead_code)]
///runs each line through the dispatcher on the given state, returning
///everything printed to the output and error streams
pub fn run_lines(st: &mut tcalc::State, lines: &[&str]) -> (String, String) {
	let mut input = &b""[..];
	let (mut out, mut err) = (Vec::new(), Vec::new());
	{
		let mut io = tcalc::IOTriple {
			input: &mut input,
			output: &mut out,
			error: &mut err
		};
		for line in lines {
			tcalc::exec(st, &mut io, line).expect("in-memory streams cannot fail");
		}
	}
	(String::from_utf8(out).unwrap(), String::from_utf8(err).unwrap())
}
