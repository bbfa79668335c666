// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use super::*;

// === Shifts and arithmetic ===

#[test]
fn test_move_shifted_register() {
    // LSL r0, r1, #2
    let (mut cpu, mut bus) = setup_thumb(&[0x0088]);
    cpu.regs_mut().set_reg(1, 0x4000_0001);

    run(&mut cpu, &mut bus, 1);

    assert_eq!(cpu.regs().reg(0), 0x0000_0004);
    assert!(cpu.regs().flag(Psr::C));
}

#[test]
fn test_lsr_zero_means_32() {
    // LSR r0, r1, #0
    let (mut cpu, mut bus) = setup_thumb(&[0x0808]);
    cpu.regs_mut().set_reg(1, 0x8000_0000);

    run(&mut cpu, &mut bus, 1);

    assert_eq!(cpu.regs().reg(0), 0);
    assert!(cpu.regs().flag(Psr::C));
    assert!(cpu.regs().flag(Psr::Z));
}

#[test]
fn test_add_subtract() {
    let (mut cpu, mut bus) = setup_thumb(&[
        0x1888, // ADD r0, r1, r2
        0x1E48, // SUB r0, r1, #1
    ]);
    cpu.regs_mut().set_reg(1, 10);
    cpu.regs_mut().set_reg(2, 0xFFFF_FFF6);

    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs().reg(0), 0);
    assert!(cpu.regs().flag(Psr::Z));
    assert!(cpu.regs().flag(Psr::C));

    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs().reg(0), 9);
    assert!(!cpu.regs().flag(Psr::Z));
}

#[test]
fn test_immediate_operations() {
    let (mut cpu, mut bus) = setup_thumb(&[
        0x217F, // MOV r1, #0x7F
        0x297F, // CMP r1, #0x7F
        0x3101, // ADD r1, #1
        0x3902, // SUB r1, #2
    ]);

    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.regs().reg(1), 0x7F);
    assert!(cpu.regs().flag(Psr::Z));

    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.regs().reg(1), 0x7E);
    assert!(!cpu.regs().flag(Psr::Z));
}

#[test]
fn test_alu_operations() {
    let (mut cpu, mut bus) = setup_thumb(&[
        0x4248, // NEG r0, r1
        0x4348, // MUL r0, r1
        0x4308, // ORR r0, r1
        0x4388, // BIC r0, r1
        0x43C8, // MVN r0, r1
    ]);
    cpu.regs_mut().set_reg(1, 3);

    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs().reg(0), (-3i32) as u32);
    assert!(cpu.regs().flag(Psr::N));

    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs().reg(0), (-9i32) as u32);

    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs().reg(0), 0xFFFF_FFF7);

    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs().reg(0), 0xFFFF_FFF4);

    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs().reg(0), 0xFFFF_FFFC);
}

#[test]
fn test_alu_register_shifts() {
    let (mut cpu, mut bus) = setup_thumb(&[
        0x4088, // LSL r0, r1
        0x41C8, // ROR r0, r1
    ]);
    cpu.regs_mut().set_reg(0, 0x0000_0011);
    cpu.regs_mut().set_reg(1, 4);

    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs().reg(0), 0x0000_0110);

    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs().reg(0), 0x0000_0011);
}

#[test]
fn test_alu_compare_and_test() {
    let (mut cpu, mut bus) = setup_thumb(&[
        0x4288, // CMP r0, r1
        0x4208, // TST r0, r1
        0x4148, // ADC r0, r1
    ]);
    cpu.regs_mut().set_reg(0, 5);
    cpu.regs_mut().set_reg(1, 2);

    run(&mut cpu, &mut bus, 1);
    assert!(cpu.regs().flag(Psr::C));
    assert!(!cpu.regs().flag(Psr::Z));

    run(&mut cpu, &mut bus, 1);
    assert!(cpu.regs().flag(Psr::Z));
    assert_eq!(cpu.regs().reg(0), 5);

    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs().reg(0), 8);
}

// === High registers ===

#[test]
fn test_hi_register_operations() {
    let (mut cpu, mut bus) = setup_thumb(&[
        0x4680, // MOV r8, r0
        0x4440, // ADD r0, r8
        0x4580, // CMP r8, r0
    ]);
    cpu.regs_mut().set_reg(0, 21);

    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.regs().reg(8), 21);
    assert_eq!(cpu.regs().reg(0), 42);

    run(&mut cpu, &mut bus, 1);
    assert!(cpu.regs().flag(Psr::N));
    assert!(!cpu.regs().flag(Psr::C));
}

#[test]
fn test_bx_returns_to_arm() {
    // BX lr
    let (mut cpu, mut bus) = setup_thumb(&[0x4770]);
    cpu.regs_mut().set_reg(14, CODE_BASE + 0x20);

    run(&mut cpu, &mut bus, 1);

    assert!(!cpu.regs().is_thumb());
    assert_eq!(cpu.regs().pc(), CODE_BASE + 0x20);
}

#[test]
fn test_bx_stays_in_thumb() {
    // BX lr
    let (mut cpu, mut bus) = setup_thumb(&[0x4770]);
    cpu.regs_mut().set_reg(14, CODE_BASE + 0x31);

    run(&mut cpu, &mut bus, 1);

    assert!(cpu.regs().is_thumb());
    assert_eq!(cpu.regs().pc(), CODE_BASE + 0x30);
}

#[test]
fn test_mov_pc_branches() {
    // MOV pc, r0
    let (mut cpu, mut bus) = setup_thumb(&[0x4687]);
    cpu.regs_mut().set_reg(0, CODE_BASE + 0x41);

    run(&mut cpu, &mut bus, 1);

    assert!(cpu.regs().is_thumb());
    assert_eq!(cpu.regs().pc(), CODE_BASE + 0x40);
}

// === Loads and stores ===

#[test]
fn test_pc_relative_load() {
    let (mut cpu, mut bus) = setup_thumb(&[
        0x0000, // LSL r0, r0, #0
        0x4801, // LDR r0, [pc, #4]
        0x0000,
        0x0000,
        0x5678,
        0x1234,
    ]);

    run(&mut cpu, &mut bus, 2);

    assert_eq!(cpu.regs().reg(0), 0x1234_5678);
}

#[test]
fn test_register_offset_transfers() {
    let (mut cpu, mut bus) = setup_thumb(&[
        0x5088, // STR r0, [r1, r2]
        0x5C8B, // LDRB r3, [r1, r2]
    ]);
    cpu.regs_mut().set_reg(0, 0xAABB_CCDD);
    cpu.regs_mut().set_reg(1, DATA_BASE);
    cpu.regs_mut().set_reg(2, 8);

    run(&mut cpu, &mut bus, 2);

    assert_eq!(bus.read32(DATA_BASE + 8).unwrap(), 0xAABB_CCDD);
    assert_eq!(cpu.regs().reg(3), 0xDD);
}

#[test]
fn test_sign_extended_transfers() {
    let (mut cpu, mut bus) = setup_thumb(&[
        0x5288, // STRH r0, [r1, r2]
        0x5E8B, // LDSH r3, [r1, r2]
        0x568C, // LDSB r4, [r1, r2]
        0x5A8D, // LDRH r5, [r1, r2]
    ]);
    cpu.regs_mut().set_reg(0, 0x0000_F080);
    cpu.regs_mut().set_reg(1, DATA_BASE);
    cpu.regs_mut().set_reg(2, 2);

    run(&mut cpu, &mut bus, 4);

    assert_eq!(bus.read16(DATA_BASE + 2).unwrap(), 0xF080);
    assert_eq!(cpu.regs().reg(3), 0xFFFF_F080);
    assert_eq!(cpu.regs().reg(4), 0xFFFF_FF80);
    assert_eq!(cpu.regs().reg(5), 0x0000_F080);
}

#[test]
fn test_immediate_offset_transfers() {
    let (mut cpu, mut bus) = setup_thumb(&[
        0x6048, // STR r0, [r1, #4]
        0x684A, // LDR r2, [r1, #4]
        0x7048, // STRB r0, [r1, #1]
        0x784B, // LDRB r3, [r1, #1]
    ]);
    cpu.regs_mut().set_reg(0, 0x1234_5678);
    cpu.regs_mut().set_reg(1, DATA_BASE);

    run(&mut cpu, &mut bus, 4);

    assert_eq!(bus.read32(DATA_BASE + 4).unwrap(), 0x1234_5678);
    assert_eq!(cpu.regs().reg(2), 0x1234_5678);
    assert_eq!(bus.read8(DATA_BASE + 1).unwrap(), 0x78);
    assert_eq!(cpu.regs().reg(3), 0x78);
}

#[test]
fn test_halfword_immediate_transfers() {
    let (mut cpu, mut bus) = setup_thumb(&[
        0x8048, // STRH r0, [r1, #2]
        0x884A, // LDRH r2, [r1, #2]
    ]);
    cpu.regs_mut().set_reg(0, 0xFFFF_BEEF);
    cpu.regs_mut().set_reg(1, DATA_BASE);

    run(&mut cpu, &mut bus, 2);

    assert_eq!(bus.read16(DATA_BASE + 2).unwrap(), 0xBEEF);
    assert_eq!(cpu.regs().reg(2), 0xBEEF);
}

#[test]
fn test_sp_relative_transfers() {
    let (mut cpu, mut bus) = setup_thumb(&[
        0x9002, // STR r0, [sp, #8]
        0x9902, // LDR r1, [sp, #8]
    ]);
    cpu.regs_mut().set_reg(0, 0xFEED_FACE);
    cpu.regs_mut().set_reg(13, DATA_BASE + 0x40);

    run(&mut cpu, &mut bus, 2);

    assert_eq!(bus.read32(DATA_BASE + 0x48).unwrap(), 0xFEED_FACE);
    assert_eq!(cpu.regs().reg(1), 0xFEED_FACE);
}

#[test]
fn test_load_address() {
    let (mut cpu, mut bus) = setup_thumb(&[
        0xA001, // ADD r0, pc, #4
        0xA902, // ADD r1, sp, #8
    ]);
    cpu.regs_mut().set_reg(13, DATA_BASE);

    run(&mut cpu, &mut bus, 2);

    assert_eq!(cpu.regs().reg(0), CODE_BASE + 8);
    assert_eq!(cpu.regs().reg(1), DATA_BASE + 8);
}

#[test]
fn test_add_offset_to_sp() {
    let (mut cpu, mut bus) = setup_thumb(&[
        0xB082, // ADD sp, #-8
        0xB004, // ADD sp, #16
    ]);
    cpu.regs_mut().set_reg(13, DATA_BASE + 0x100);

    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs().reg(13), DATA_BASE + 0xF8);

    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs().reg(13), DATA_BASE + 0x108);
}

#[test]
fn test_push_and_pop() {
    let (mut cpu, mut bus) = setup_thumb(&[
        0xB503, // PUSH {r0, r1, lr}
        0x2000, // MOV r0, #0
        0x2100, // MOV r1, #0
        0xBD03, // POP {r0, r1, pc}
    ]);
    cpu.regs_mut().set_reg(0, 0xA);
    cpu.regs_mut().set_reg(1, 0xB);
    cpu.regs_mut().set_reg(13, DATA_BASE + 0x100);
    cpu.regs_mut().set_reg(14, CODE_BASE + 0x51);

    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs().reg(13), DATA_BASE + 0xF4);
    assert_eq!(bus.read32(DATA_BASE + 0xF4).unwrap(), 0xA);
    assert_eq!(bus.read32(DATA_BASE + 0xF8).unwrap(), 0xB);
    assert_eq!(bus.read32(DATA_BASE + 0xFC).unwrap(), CODE_BASE + 0x51);

    run(&mut cpu, &mut bus, 3);
    assert_eq!(cpu.regs().reg(0), 0xA);
    assert_eq!(cpu.regs().reg(1), 0xB);
    assert_eq!(cpu.regs().reg(13), DATA_BASE + 0x100);
    assert_eq!(cpu.regs().pc(), CODE_BASE + 0x50);
    assert!(cpu.regs().is_thumb());
}

#[test]
fn test_multiple_load_store() {
    let (mut cpu, mut bus) = setup_thumb(&[
        0xC006, // STMIA r0!, {r1, r2}
        0xC818, // LDMIA r0!, {r3, r4}
    ]);
    cpu.regs_mut().set_reg(0, DATA_BASE);
    cpu.regs_mut().set_reg(1, 0x111);
    cpu.regs_mut().set_reg(2, 0x222);
    bus.write32(DATA_BASE + 8, 0x333).unwrap();
    bus.write32(DATA_BASE + 12, 0x444).unwrap();

    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs().reg(0), DATA_BASE + 8);
    assert_eq!(bus.read32(DATA_BASE).unwrap(), 0x111);
    assert_eq!(bus.read32(DATA_BASE + 4).unwrap(), 0x222);

    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs().reg(3), 0x333);
    assert_eq!(cpu.regs().reg(4), 0x444);
    assert_eq!(cpu.regs().reg(0), DATA_BASE + 16);
}

// === Branches ===

#[test]
fn test_conditional_branch_taken() {
    // BEQ +4
    let (mut cpu, mut bus) = setup_thumb(&[0xD002]);
    cpu.regs_mut().set_flag(Psr::Z, true);

    run(&mut cpu, &mut bus, 1);

    assert_eq!(cpu.regs().pc(), CODE_BASE + 8);
}

#[test]
fn test_conditional_branch_not_taken() {
    // BEQ +4
    let (mut cpu, mut bus) = setup_thumb(&[0xD002]);

    let outcome = cpu.step(&mut bus).unwrap();

    assert_eq!(outcome, StepOutcome::Executed);
    assert_eq!(cpu.regs().pc(), CODE_BASE + 2);
}

#[test]
fn test_conditional_branch_backwards() {
    // BNE . (offset -4 from PC + 4)
    let (mut cpu, mut bus) = setup_thumb(&[0xD1FE]);

    run(&mut cpu, &mut bus, 2);

    assert_eq!(cpu.regs().pc(), CODE_BASE);
}

#[test]
fn test_unconditional_branch() {
    // B +16
    let (mut cpu, mut bus) = setup_thumb(&[0xE008]);

    run(&mut cpu, &mut bus, 1);

    assert_eq!(cpu.regs().pc(), CODE_BASE + 0x14);
}

#[test]
fn test_unconditional_branch_backwards() {
    // B .
    let (mut cpu, mut bus) = setup_thumb(&[0xE7FE]);

    run(&mut cpu, &mut bus, 1);

    assert_eq!(cpu.regs().pc(), CODE_BASE);
}

#[test]
fn test_long_branch_link() {
    // BL +0x100
    let (mut cpu, mut bus) = setup_thumb(&[0xF000, 0xF880]);

    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs().reg(14), CODE_BASE + 4);

    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs().pc(), CODE_BASE + 0x104);
    assert_eq!(cpu.regs().reg(14), (CODE_BASE + 4) | 1);
    assert!(cpu.regs().is_thumb());
}

#[test]
fn test_long_branch_link_backwards() {
    // BL to the first half itself
    let (mut cpu, mut bus) = setup_thumb(&[0xF7FF, 0xFFFE]);

    run(&mut cpu, &mut bus, 2);

    assert_eq!(cpu.regs().pc(), CODE_BASE);
    assert_eq!(cpu.regs().reg(14), (CODE_BASE + 4) | 1);
}

// === Exceptions ===

#[test]
fn test_swi_leaves_thumb_state() {
    // SWI 5
    let (mut cpu, mut bus) = setup_thumb(&[0xDF05]);

    run(&mut cpu, &mut bus, 1);

    let regs = cpu.regs();
    assert!(!regs.is_thumb());
    assert_eq!(regs.mode(), Some(Mode::Supervisor));
    assert_eq!(regs.pc(), CPU::VECTOR_SWI);
    assert_eq!(regs.reg(14), CODE_BASE + 2);
    assert!(regs.spsr().contains(Psr::T));
}

#[test]
fn test_undefined_thumb_instruction() {
    let (mut cpu, mut bus) = setup_thumb(&[0xDE00]);

    run(&mut cpu, &mut bus, 1);

    assert_eq!(cpu.regs().mode(), Some(Mode::Undefined));
    assert_eq!(cpu.regs().pc(), CPU::VECTOR_UNDEFINED);
    assert!(!cpu.regs().is_thumb());
}
