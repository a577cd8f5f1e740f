use chip8_vm::{Chip8Error, Machine, FONT_BYTES, MAX_PROGRAM_SIZE, PROGRAM_START};

#[test]
fn fresh_machine_is_reset() {
    let machine = Machine::new();

    assert_eq!(machine.pc, 0x200);
    assert_eq!(machine.index, 0);
    assert_eq!(machine.registers, [0; 16]);
    assert_eq!(machine.stack, [0; 16]);
    assert_eq!(machine.stack_pointer, 0);
    assert_eq!(machine.delay_timer, 0);
    assert_eq!(machine.sound_timer, 0);
    assert!(machine.display().iter().all(|pixel| *pixel == 0));
    assert_eq!(machine.memory[..80], FONT_BYTES);
    assert!(machine.memory[80..].iter().all(|byte| *byte == 0));
    assert!(!machine.is_awaiting_key());
}

#[test]
fn reset_clears_a_used_machine() {
    let mut machine = Machine::with_seed(3);
    machine.load_program(&[0x12, 0x34]).unwrap();
    machine.registers[4] = 9;
    machine.pc = 0x456;
    machine.index = 0x321;
    machine.stack[0] = 0x222;
    machine.stack_pointer = 1;
    machine.delay_timer = 10;
    machine.sound_timer = 10;
    machine.screen_buffer[5] = 1;
    machine.set_key(3, true);

    machine.reset();

    assert_eq!(machine.pc, PROGRAM_START);
    assert_eq!(machine.index, 0);
    assert_eq!(machine.registers, [0; 16]);
    assert_eq!(machine.stack_pointer, 0);
    assert_eq!(machine.delay_timer, 0);
    assert_eq!(machine.sound_timer, 0);
    assert_eq!(machine.memory[PROGRAM_START..PROGRAM_START + 2], [0, 0]);
    assert_eq!(machine.memory[..80], FONT_BYTES);
    assert!(machine.display().iter().all(|pixel| *pixel == 0));
    assert_eq!(machine.first_pressed_key(), None);
}

#[test]
fn load_program_copies_to_program_start() {
    let mut machine = Machine::new();
    let program = [0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF];

    machine.load_program(&program).unwrap();

    assert_eq!(machine.memory[0x200..0x208], program);
    assert_eq!(machine.memory[0x208], 0);
}

#[test]
fn load_program_accepts_exact_maximum() {
    let mut machine = Machine::new();
    let program = vec![0xAB; MAX_PROGRAM_SIZE];

    machine.load_program(&program).unwrap();

    assert_eq!(machine.memory[0xFFF], 0xAB);
}

#[test]
fn load_program_rejects_oversized_image() {
    let mut machine = Machine::new();
    let program = vec![0xAB; MAX_PROGRAM_SIZE + 1];

    let result = machine.load_program(&program);

    assert!(matches!(
        result,
        Err(Chip8Error::ProgramTooLarge {
            size: 3585,
            max: 3584
        })
    ));
    assert_eq!(machine.memory[0x200], 0);
}

#[test]
fn load_program_file_reads_rom() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(tmp.path(), [0x00, 0xE0, 0x12, 0x00]).unwrap();
    let mut machine = Machine::new();

    machine.load_program_file(tmp.path()).unwrap();

    assert_eq!(machine.memory[0x200..0x204], [0x00, 0xE0, 0x12, 0x00]);
}

#[test]
fn load_program_file_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut machine = Machine::new();

    let result = machine.load_program_file(&dir.path().join("missing.ch8"));

    assert!(matches!(result, Err(Chip8Error::Io(_))));
}

#[test]
fn key_matrix_ignores_out_of_range_keys() {
    let mut machine = Machine::new();

    machine.set_key(16, true);
    assert_eq!(machine.first_pressed_key(), None);

    machine.set_key(0xC, true);
    machine.set_key(0x5, true);
    assert_eq!(machine.first_pressed_key(), Some(0x5));

    machine.release_all_keys();
    assert_eq!(machine.first_pressed_key(), None);
}

#[test]
fn pixel_reads_linear_buffer() {
    let mut machine = Machine::new();
    machine.screen_buffer[3 * 64 + 7] = 1;

    assert!(machine.pixel(7, 3));
    assert!(!machine.pixel(3, 7));
    assert!(!machine.pixel(64, 0));
}

#[test]
fn machines_are_independent() {
    let mut first = Machine::with_seed(1);
    let second = Machine::with_seed(1);

    first.registers[0] = 0xAA;
    first.memory[0x300] = 0xBB;

    assert_eq!(second.registers[0], 0);
    assert_eq!(second.memory[0x300], 0);
}

#[test]
fn fatal_classification() {
    assert!(Chip8Error::AddressOutOfRange { address: 0x1000 }.is_fatal());
    assert!(Chip8Error::ProgramTooLarge { size: 1, max: 0 }.is_fatal());
    assert!(!Chip8Error::UnknownOpcode { opcode: 0x5FFF, pc: 0x200 }.is_fatal());
    assert!(!Chip8Error::StackOverflow { pc: 0x200 }.is_fatal());
    assert!(!Chip8Error::StackUnderflow { pc: 0x200 }.is_fatal());
}
