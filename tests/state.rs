use tcalc::{CalcError, State};

#[test]
fn arithmetic_drives_the_accumulator() {
	let mut st = State::new();
	st.add(5.0);
	st.multiply(3.0);
	st.subtract(1.0);
	assert_eq!(st.ans(), 14.0);
	st.divide(7.0);
	assert_eq!(st.ans(), 2.0);
	st.power(10.0);
	assert_eq!(st.ans(), 1024.0);
	st.modulo(10.0);
	assert_eq!(st.ans(), 4.0);
}

#[test]
fn division_by_zero_is_not_a_fault() {
	let mut st = State::new();
	st.add(10.0);
	st.divide(0.0);
	assert_eq!(st.ans(), f64::INFINITY);

	let mut st = State::new();
	st.divide(0.0);	//0/0
	assert!(st.ans().is_nan());
}

#[test]
fn modulo_sign_follows_the_dividend() {
	let mut st = State::new();
	st.subtract(7.0);
	st.modulo(3.0);
	assert_eq!(st.ans(), -1.0);
}

#[test]
fn nan_from_power_propagates_silently() {
	let mut st = State::new();
	st.subtract(8.0);
	st.power(0.5);
	assert!(st.ans().is_nan());
	st.add(1.0);
	assert!(st.ans().is_nan());
}

#[test]
fn undo_restores_the_exact_previous_value() {
	let mut st = State::new();
	st.add(0.1);
	st.add(0.2);
	let before = st.ans();
	st.multiply(123.456);
	assert!(st.undo());
	assert_eq!(st.ans(), before);
}

#[test]
fn undo_on_a_fresh_state_reports_nothing() {
	let mut st = State::new();
	assert!(!st.undo());
	assert_eq!(st.ans(), 0.0);
}

#[test]
fn undo_unwinds_in_lifo_order() {
	let mut st = State::new();
	st.add(1.0);
	st.add(2.0);
	st.add(4.0);
	assert!(st.undo());
	assert_eq!(st.ans(), 3.0);
	assert!(st.undo());
	assert_eq!(st.ans(), 1.0);
	assert!(st.undo());
	assert_eq!(st.ans(), 0.0);
	assert!(!st.undo());
}

#[test]
fn undo_never_resurrects_variables() {
	let mut st = State::new();
	st.add(3.0);
	st.save_var("x").unwrap();
	st.delete_var("x").unwrap();
	st.undo();	//reverses the add, not the delete
	assert!(matches!(st.get_var("x"), Err(CalcError::UnknownVariable(_))));
}

#[test]
fn variables_keep_the_value_current_at_save_time() {
	let mut st = State::new();
	st.add(3.5);
	st.save_var("x").unwrap();
	st.multiply(100.0);
	st.load_var("x").unwrap();
	assert_eq!(st.ans(), 3.5);
	assert!(st.undo());	//the load itself is recorded
	assert_eq!(st.ans(), 350.0);
}

#[test]
fn save_overwrites_an_existing_name() {
	let mut st = State::new();
	st.add(1.0);
	st.save_var("x").unwrap();
	st.add(1.0);
	st.save_var("x").unwrap();
	assert_eq!(st.get_var("x").unwrap(), 2.0);
}

#[test]
fn variable_names_are_lowercase_letters_only() {
	let mut st = State::new();
	assert!(matches!(st.save_var("ABC"), Err(CalcError::InvalidVariableName)));
	assert!(matches!(st.save_var("a1"), Err(CalcError::InvalidVariableName)));
	assert!(matches!(st.save_var(""), Err(CalcError::InvalidVariableName)));
	assert!(matches!(st.save_var("a b"), Err(CalcError::InvalidVariableName)));
	st.save_var("abc").unwrap();
	assert_eq!(st.get_var("abc").unwrap(), 0.0);
	assert_eq!(st.var_names().count(), 1);
}

#[test]
fn set_var_bypasses_name_validation() {
	let mut st = State::new();
	st.set_var("A1", 9.0);
	assert_eq!(st.get_var("A1").unwrap(), 9.0);
}

#[test]
fn missing_names_fault_everywhere() {
	let mut st = State::new();
	assert!(matches!(st.get_var("nope"), Err(CalcError::UnknownVariable(_))));
	assert!(matches!(st.load_var("nope"), Err(CalcError::UnknownVariable(_))));
	assert!(matches!(st.delete_var("nope"), Err(CalcError::UnknownVariable(_))));
	assert_eq!(st.ans(), 0.0);
	assert!(!st.undo());	//failed loads record nothing
}

#[test]
fn fibonacci_values() {
	for (idx, expected) in [(0.0, 0.0), (1.0, 1.0), (2.0, 1.0), (10.0, 55.0), (20.0, 6765.0)] {
		let mut st = State::new();
		st.add(idx);
		st.fibonacci().unwrap();
		assert_eq!(st.ans(), expected, "F({idx})");
	}
}

#[test]
fn fibonacci_truncates_the_index_toward_zero() {
	let mut st = State::new();
	st.add(10.9);
	st.fibonacci().unwrap();
	assert_eq!(st.ans(), 55.0);
}

#[test]
fn fibonacci_is_undoable() {
	let mut st = State::new();
	st.add(10.0);
	st.fibonacci().unwrap();
	assert_eq!(st.ans(), 55.0);
	assert!(st.undo());
	assert_eq!(st.ans(), 10.0);
}

#[test]
fn negative_fibonacci_index_aborts_before_recording() {
	let mut st = State::new();
	st.subtract(1.0);	//ans = -1, one history entry so far
	assert!(matches!(st.fibonacci(), Err(CalcError::InvalidFibonacciIndex)));
	assert_eq!(st.ans(), -1.0);
	assert!(st.undo());	//only the subtract was recorded
	assert_eq!(st.ans(), 0.0);
	assert!(!st.undo());
}

#[test]
fn error_messages_match_the_session_wording() {
	let mut st = State::new();
	assert_eq!(st.get_var("ghost").unwrap_err().to_string(), "Unknown variable 'ghost'.");
	assert_eq!(st.save_var("Ghost").unwrap_err().to_string(), "Invalid variable name. Use lowercase letters only.");
	st.subtract(2.0);
	assert_eq!(st.fibonacci().unwrap_err().to_string(), "Fibonacci index must be non-negative.");
}
