use super::*;
use crate::utils::test_utils::utils::{
    COMPARE_TO_8, EQUALS_8_POSITION, LESS_THAN_8_IMMEDIATE, QUINE, outputs, program,
};
use proptest::prelude::*;

fn computer(source: &str) -> Computer {
    Computer::new(&program(source))
}

/// Runs a program that takes no input and returns its final memory.
fn run_to_halt(source: &str) -> Vec<Cell> {
    let mut computer = computer(source);
    let result = computer.run_with([]).expect("vm run failed");
    assert!(result.halted);
    computer.memory().as_slice().to_vec()
}

fn run_expect_err(source: &str, input: &[Cell]) -> VMError {
    computer(source)
        .run_with(input.iter().copied())
        .expect_err("expected error")
}

// ==================== Arithmetic ====================

#[test]
fn add_and_multiply_reach_fixed_point() {
    let memory = run_to_halt("1,9,10,3,2,3,11,0,99,30,40,50");
    assert_eq!(memory[0], 3500);
    assert_eq!(memory, vec![3500, 9, 10, 70, 2, 3, 11, 0, 99, 30, 40, 50]);
}

#[test]
fn small_arithmetic_programs() {
    assert_eq!(run_to_halt("1,0,0,0,99"), vec![2, 0, 0, 0, 99]);
    assert_eq!(run_to_halt("2,3,0,3,99"), vec![2, 3, 0, 6, 99]);
    assert_eq!(run_to_halt("2,4,4,5,99,0"), vec![2, 4, 4, 5, 99, 9801]);
    assert_eq!(
        run_to_halt("1,1,1,4,99,5,6,0,99"),
        vec![30, 1, 1, 4, 2, 5, 6, 0, 99]
    );
}

#[test]
fn immediate_operands_and_negative_values() {
    // 1002,4,3,4: memory[4] = memory[4] * 3 = 99
    assert_eq!(run_to_halt("1002,4,3,4,33"), vec![1002, 4, 3, 4, 99]);
    // 1101,100,-1,4: memory[4] = 100 + -1 = 99
    assert_eq!(run_to_halt("1101,100,-1,4,0"), vec![1101, 100, -1, 4, 99]);
}

#[test]
fn arithmetic_wraps_instead_of_panicking() {
    let memory = run_to_halt(&format!("1101,{},1,5,99,0", Cell::MAX));
    assert_eq!(memory[5], Cell::MIN);
    let memory = run_to_halt(&format!("1102,{},2,5,99,0", Cell::MAX));
    assert_eq!(memory[5], -2);
}

// ==================== I/O ====================

#[test]
fn input_is_echoed() {
    assert_eq!(outputs("3,0,4,0,99", &[-42]), vec![-42]);
}

#[test]
fn equals_and_less_than() {
    assert_eq!(outputs(EQUALS_8_POSITION, &[8]), vec![1]);
    assert_eq!(outputs(EQUALS_8_POSITION, &[7]), vec![0]);
    assert_eq!(outputs(LESS_THAN_8_IMMEDIATE, &[7]), vec![1]);
    assert_eq!(outputs(LESS_THAN_8_IMMEDIATE, &[8]), vec![0]);
    assert_eq!(outputs(LESS_THAN_8_IMMEDIATE, &[-100]), vec![1]);
    assert_eq!(outputs("3,3,1108,-1,8,3,4,3,99", &[8]), vec![1]);
    assert_eq!(outputs("3,9,7,9,10,9,4,9,99,-1,8", &[9]), vec![0]);
}

#[test]
fn jumps() {
    let position = "3,12,6,12,15,1,13,14,13,4,13,99,-1,0,1,9";
    let immediate = "3,3,1105,-1,9,1101,0,0,12,4,12,99,1";
    for source in [position, immediate] {
        assert_eq!(outputs(source, &[0]), vec![0]);
        assert_eq!(outputs(source, &[5]), vec![1]);
        assert_eq!(outputs(source, &[-5]), vec![1]);
    }
}

#[test]
fn compare_to_eight() {
    assert_eq!(outputs(COMPARE_TO_8, &[7]), vec![999]);
    assert_eq!(outputs(COMPARE_TO_8, &[8]), vec![1000]);
    assert_eq!(outputs(COMPARE_TO_8, &[9]), vec![1001]);
}

#[test]
fn leftover_input_stays_queued() {
    let mut computer = computer("3,0,99");
    let mut input = VecDeque::from([1, 2, 3]);
    let result = computer.run(&mut input).unwrap();
    assert!(result.halted);
    assert_eq!(input, VecDeque::from([2, 3]));
}

// ==================== Relative base and memory ====================

#[test]
fn quine_outputs_itself() {
    let expected = program(QUINE).cells().to_vec();
    assert_eq!(outputs(QUINE, &[]), expected);
}

#[test]
fn large_numbers() {
    assert_eq!(outputs("104,1125899906842624,99", &[]), vec![1125899906842624]);
    let out = outputs("1102,34915192,34915192,7,4,7,99,0", &[]);
    assert_eq!(out, vec![1219070632396864]);
    assert_eq!(out[0].to_string().len(), 16);
}

#[test]
fn relative_base_offsets() {
    // rb = 2000 + 19, then output memory[2019 - 34] = memory[1985]
    let source = program("109,2000,109,19,204,-34,99").with_patch(1985, 77);
    let mut computer = Computer::new(&source);
    let result = computer.run_with([]).unwrap();
    assert_eq!(result.output, VecDeque::from([77]));
    assert_eq!(computer.relative_base(), 2019);
}

#[test]
fn relative_write_target() {
    // rb = 10; IN [rb+5]; OUT [15]
    assert_eq!(outputs("109,10,203,5,4,15,99", &[31]), vec![31]);
}

#[test]
fn memory_grows_on_write_beyond_program() {
    let mut computer = computer("1101,5,6,1000,4,1000,99");
    let result = computer.run_with([]).unwrap();
    assert_eq!(result.output, VecDeque::from([11]));
    assert_eq!(computer.memory().len(), 1001);
    assert_eq!(computer.memory()[1000], 11);
}

#[test]
fn unwritten_memory_reads_zero() {
    assert_eq!(outputs("4,5000,99", &[]), vec![0]);
    assert_eq!(outputs("109,700,204,300,99", &[]), vec![0]);
}

// ==================== Suspension ====================

#[test]
fn suspends_on_empty_input_without_advancing() {
    let mut computer = computer(EQUALS_8_POSITION);
    let result = computer.run_with([]).unwrap();
    assert!(!result.halted);
    assert!(result.output.is_empty());
    assert_eq!(computer.pc(), 0);
    assert!(!computer.is_halted());

    let result = computer.run_with([8]).unwrap();
    assert!(result.halted);
    assert_eq!(result.output, VecDeque::from([1]));
    assert!(computer.is_halted());
}

#[test]
fn suspension_returns_output_so_far() {
    // OUT 7; IN [0]; OUT [0]; HALT
    let mut computer = computer("104,7,3,0,4,0,99");
    let first = computer.run_with([]).unwrap();
    assert_eq!(first.output, VecDeque::from([7]));
    assert!(!first.halted);
    assert_eq!(computer.pc(), 2);

    let second = computer.run_with([9]).unwrap();
    assert_eq!(second.output, VecDeque::from([9]));
    assert!(second.halted);
}

#[test]
fn repeated_suspension_is_idempotent() {
    let mut computer = computer("3,0,4,0,99");
    for _ in 0..3 {
        let result = computer.run_with([]).unwrap();
        assert!(!result.halted);
        assert!(result.output.is_empty());
        assert_eq!(computer.pc(), 0);
    }
    assert_eq!(computer.run_with([5]).unwrap().output, VecDeque::from([5]));
}

#[test]
fn step_reports_each_outcome() {
    let mut computer = computer("104,7,3,0,1101,1,1,0,99");
    let mut input = VecDeque::new();
    assert_eq!(computer.step(&mut input).unwrap(), Step::Output(7));
    assert_eq!(computer.step(&mut input).unwrap(), Step::NeedsInput);
    assert_eq!(computer.pc(), 2);
    input.push_back(4);
    assert_eq!(computer.step(&mut input).unwrap(), Step::Continue);
    assert_eq!(computer.step(&mut input).unwrap(), Step::Continue);
    assert_eq!(computer.step(&mut input).unwrap(), Step::Halted);
    assert_eq!(computer.memory()[0], 2);
}

#[test]
fn run_after_halt_is_rejected() {
    let mut computer = computer("99");
    assert!(computer.run_with([]).unwrap().halted);
    assert!(matches!(computer.run_with([]), Err(VMError::AlreadyHalted)));
    assert!(matches!(
        computer.step(&mut VecDeque::new()),
        Err(VMError::AlreadyHalted)
    ));
}

#[test]
fn clones_run_independently() {
    let mut original = computer("3,20,4,20,99");
    assert!(!original.run_with([]).unwrap().halted);

    let mut copy = original.clone();
    assert_eq!(copy.run_with([1]).unwrap().output, VecDeque::from([1]));
    assert_eq!(original.run_with([2]).unwrap().output, VecDeque::from([2]));
    assert_eq!(copy.memory()[20], 1);
    assert_eq!(original.memory()[20], 2);
}

// ==================== Errors ====================

#[test]
fn invalid_opcode_aborts() {
    assert!(matches!(
        run_expect_err("1,0,0,0,42", &[]),
        VMError::InvalidOpcode { cell: 42, pc: 4 }
    ));
}

#[test]
fn invalid_mode_aborts() {
    assert!(matches!(
        run_expect_err("304,0,99", &[]),
        VMError::InvalidMode {
            mode: 3,
            slot: 1,
            pc: 0,
            ..
        }
    ));
}

#[test]
fn immediate_write_target_aborts() {
    assert!(matches!(
        run_expect_err("11101,1,1,3,99", &[]),
        VMError::ImmediateWrite { slot: 3, pc: 0, .. }
    ));
    assert!(matches!(
        run_expect_err("103,5,99", &[1]),
        VMError::ImmediateWrite { slot: 1, .. }
    ));
}

#[test]
fn negative_addresses_abort() {
    assert!(matches!(
        run_expect_err("4,-1,99", &[]),
        VMError::NegativeAddress { address: -1 }
    ));
    assert!(matches!(
        run_expect_err("1105,1,-5", &[]),
        VMError::NegativeAddress { address: -5 }
    ));
}

#[test]
fn error_leaves_computer_unhalted() {
    let mut computer = computer("3,0,77");
    assert!(computer.run_with([1]).is_err());
    assert!(!computer.is_halted());
}

#[test]
fn aborted_computer_stays_faulted() {
    let mut computer = computer("3,0,77");
    assert!(matches!(
        computer.run_with([1]),
        Err(VMError::InvalidOpcode { cell: 77, pc: 2 })
    ));
    assert!(computer.is_faulted());

    let pc = computer.pc();
    assert!(matches!(computer.run_with([5]), Err(VMError::Faulted)));
    assert!(matches!(
        computer.step(&mut VecDeque::from([5])),
        Err(VMError::Faulted)
    ));
    assert_eq!(computer.pc(), pc);
    assert_eq!(computer.memory()[0], 1);
}

#[test]
fn healthy_computer_is_not_faulted() {
    let mut computer = computer("3,0,99");
    assert!(!computer.run_with([]).unwrap().halted);
    assert!(!computer.is_faulted());
    assert!(computer.run_with([4]).unwrap().halted);
    assert!(!computer.is_faulted());
}

#[test]
fn write_far_beyond_program() {
    // *(2^62) = 5; OUT *(2^62); HALT
    let far = 1_i64 << 62;
    let source = format!("1101,5,0,{far},4,{far},99");
    let mut computer = computer(&source);
    let result = computer.run_with([]).unwrap();
    assert_eq!(result.output, VecDeque::from([5]));
    assert_eq!(computer.memory().read(far).unwrap(), 5);
    assert_eq!(computer.memory().len(), 7);
}

// ==================== Properties ====================

/// IN a; IN b; LT/EQ a, b -> [13]; OUT [13]; HALT
fn comparison_program(opcode: Cell) -> Program {
    Program::new(vec![3, 11, 3, 12, opcode, 11, 12, 13, 4, 13, 99, 0, 0, 0])
}

proptest! {
    /// Comparisons store exactly 0 or 1.
    #[test]
    fn prop_comparisons_are_boolean(a in any::<Cell>(), b in any::<Cell>()) {
        let lt = Computer::new(&comparison_program(7)).run_with([a, b]).unwrap();
        let eq = Computer::new(&comparison_program(8)).run_with([a, b]).unwrap();
        prop_assert_eq!(lt.output, VecDeque::from([Cell::from(a < b)]));
        prop_assert_eq!(eq.output, VecDeque::from([Cell::from(a == b)]));

        let same = Computer::new(&comparison_program(8)).run_with([a, a]).unwrap();
        prop_assert_eq!(same.output, VecDeque::from([1]));
    }

    /// Feeding input in two calls ends in the same state as feeding it at once.
    #[test]
    fn prop_split_input_matches_joined(a in any::<Cell>(), b in any::<Cell>()) {
        // IN a; IN b; ADD a, b -> [13]; OUT [13]; HALT
        let source = Program::new(vec![3, 11, 3, 12, 1, 11, 12, 13, 4, 13, 99, 0, 0, 0]);

        let mut joined = Computer::new(&source);
        let joined_out = joined.run_with([a, b]).unwrap();

        let mut split = Computer::new(&source);
        let first = split.run_with([a]).unwrap();
        prop_assert!(!first.halted);
        prop_assert!(first.output.is_empty());
        let second = split.run_with([b]).unwrap();

        prop_assert!(joined_out.halted && second.halted);
        prop_assert_eq!(joined_out.output, second.output);
        prop_assert_eq!(joined.memory(), split.memory());
    }

    /// A relative operand resolves to the same cell as the equivalent position operand.
    #[test]
    fn prop_relative_matches_position(value in any::<Cell>(), base in -50 as Cell..50) {
        let mut position = vec![4, 20, 99];
        position.resize(21, 0);
        position[20] = value;

        let mut relative = vec![109, base, 204, 20 - base, 99];
        relative.resize(21, 0);
        relative[20] = value;

        let by_position = Computer::new(&Program::new(position)).run_with([]).unwrap();
        let by_relative = Computer::new(&Program::new(relative)).run_with([]).unwrap();
        prop_assert_eq!(by_position.output, VecDeque::from([value]));
        prop_assert_eq!(by_relative.output, VecDeque::from([value]));
    }

    /// Writing through a relative operand lands on the same address as position mode.
    #[test]
    fn prop_relative_write_matches_position(value in any::<Cell>(), base in 0 as Cell..40) {
        let by_position = Program::new(vec![3, 50, 99]);
        let by_relative = Program::new(vec![109, base, 203, 50 - base, 99]);

        let mut p = Computer::new(&by_position);
        p.run_with([value]).unwrap();
        let mut r = Computer::new(&by_relative);
        r.run_with([value]).unwrap();
        prop_assert_eq!(p.memory()[50], value);
        prop_assert_eq!(r.memory()[50], value);
    }

    /// Far writes read back; untouched far cells read as zero.
    #[test]
    fn prop_far_memory(address in 10 as Cell..(1 << 62), value in any::<Cell>()) {
        // IN [address]; OUT [address]; OUT [address + 1]; HALT
        let source = Program::new(vec![3, address, 4, address, 4, address + 1, 99]);
        let result = Computer::new(&source).run_with([value]).unwrap();
        prop_assert_eq!(result.output, VecDeque::from([value, 0]));
    }
}
