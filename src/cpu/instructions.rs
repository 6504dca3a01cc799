//! Handlers for the official 6502 mnemonics.
//!
//! Handlers run with PC already past the opcode byte. Those taking an
//! operand are generic over their addressing mode and are instantiated once
//! per mode in the opcode table.

use super::addressing::{Addressing, Effective};
use super::{Cpu, Interrupts, Status, IRQ_VECTOR};

// Loads and stores

pub(crate) fn lda<M: Addressing>(cpu: &mut Cpu) {
    let operand = M::resolve(cpu);
    cpu.regs.a = cpu.load(operand);
    cpu.update_nz(cpu.regs.a);
}

pub(crate) fn ldx<M: Addressing>(cpu: &mut Cpu) {
    let operand = M::resolve(cpu);
    cpu.regs.x = cpu.load(operand);
    cpu.update_nz(cpu.regs.x);
}

pub(crate) fn ldy<M: Addressing>(cpu: &mut Cpu) {
    let operand = M::resolve(cpu);
    cpu.regs.y = cpu.load(operand);
    cpu.update_nz(cpu.regs.y);
}

pub(crate) fn sta<M: Effective>(cpu: &mut Cpu) {
    let addr = M::effective(cpu);
    cpu.write(addr, cpu.regs.a);
}

pub(crate) fn stx<M: Effective>(cpu: &mut Cpu) {
    let addr = M::effective(cpu);
    cpu.write(addr, cpu.regs.x);
}

pub(crate) fn sty<M: Effective>(cpu: &mut Cpu) {
    let addr = M::effective(cpu);
    cpu.write(addr, cpu.regs.y);
}

// Arithmetic and logic

fn add_with_carry(cpu: &mut Cpu, operand: u8) {
    let a = cpu.regs.a;
    let carry = cpu.test_flag(Status::CARRY) as u16;
    let total = a as u16 + operand as u16 + carry;
    let result = total as u8;

    cpu.regs.a = result;
    cpu.update_nzc(total);
    cpu.set_flag_if(Status::OVERFLOW, (!(operand ^ a) & (operand ^ result) & 0x80) != 0);
}

pub(crate) fn adc<M: Addressing>(cpu: &mut Cpu) {
    let operand = M::resolve(cpu);
    let value = cpu.load(operand);
    add_with_carry(cpu, value);
}

/// Binary subtraction as addition of the one's complement; C means "no borrow".
pub(crate) fn sbc<M: Addressing>(cpu: &mut Cpu) {
    let operand = M::resolve(cpu);
    let value = cpu.load(operand);
    add_with_carry(cpu, !value);
}

pub(crate) fn and<M: Addressing>(cpu: &mut Cpu) {
    let operand = M::resolve(cpu);
    let value = cpu.load(operand);
    cpu.regs.a &= value;
    cpu.update_nz(cpu.regs.a);
}

pub(crate) fn ora<M: Addressing>(cpu: &mut Cpu) {
    let operand = M::resolve(cpu);
    let value = cpu.load(operand);
    cpu.regs.a |= value;
    cpu.update_nz(cpu.regs.a);
}

pub(crate) fn eor<M: Addressing>(cpu: &mut Cpu) {
    let operand = M::resolve(cpu);
    let value = cpu.load(operand);
    cpu.regs.a ^= value;
    cpu.update_nz(cpu.regs.a);
}

pub(crate) fn bit<M: Addressing>(cpu: &mut Cpu) {
    let operand = M::resolve(cpu);
    let value = cpu.load(operand);
    cpu.set_flag_if(Status::ZERO, cpu.regs.a & value == 0);
    cpu.set_flag_if(Status::NEGATIVE, value & 0x80 != 0);
    cpu.set_flag_if(Status::OVERFLOW, value & 0x40 != 0);
}

fn compare(cpu: &mut Cpu, register: u8, value: u8) {
    // register + !value + 1 sets bit 8 exactly when no borrow occurs
    let result = register as u16 + (!value) as u16 + 1;
    cpu.update_nzc(result);
}

pub(crate) fn cmp<M: Addressing>(cpu: &mut Cpu) {
    let operand = M::resolve(cpu);
    let value = cpu.load(operand);
    let register = cpu.regs.a;
    compare(cpu, register, value);
}

pub(crate) fn cpx<M: Addressing>(cpu: &mut Cpu) {
    let operand = M::resolve(cpu);
    let value = cpu.load(operand);
    let register = cpu.regs.x;
    compare(cpu, register, value);
}

pub(crate) fn cpy<M: Addressing>(cpu: &mut Cpu) {
    let operand = M::resolve(cpu);
    let value = cpu.load(operand);
    let register = cpu.regs.y;
    compare(cpu, register, value);
}

// Shifts and rotates (read-modify-write on memory or A)

pub(crate) fn asl<M: Addressing>(cpu: &mut Cpu) {
    let operand = M::resolve(cpu);
    let shifted = (cpu.load(operand) as u16) << 1;
    cpu.store(operand, shifted as u8);
    cpu.update_nzc(shifted);
}

pub(crate) fn lsr<M: Addressing>(cpu: &mut Cpu) {
    let operand = M::resolve(cpu);
    let value = cpu.load(operand);
    let shifted = value >> 1;
    cpu.store(operand, shifted);
    cpu.update_nz(shifted);
    cpu.set_flag_if(Status::CARRY, value & 0x01 != 0);
}

pub(crate) fn rol<M: Addressing>(cpu: &mut Cpu) {
    let operand = M::resolve(cpu);
    let carry_in = cpu.test_flag(Status::CARRY) as u16;
    let rotated = ((cpu.load(operand) as u16) << 1) | carry_in;
    cpu.store(operand, rotated as u8);
    cpu.update_nzc(rotated);
}

pub(crate) fn ror<M: Addressing>(cpu: &mut Cpu) {
    let operand = M::resolve(cpu);
    let carry_in = (cpu.test_flag(Status::CARRY) as u8) << 7;
    let value = cpu.load(operand);
    let rotated = (value >> 1) | carry_in;
    cpu.store(operand, rotated);
    cpu.update_nz(rotated);
    cpu.set_flag_if(Status::CARRY, value & 0x01 != 0);
}

// Increments and decrements

pub(crate) fn inc<M: Effective>(cpu: &mut Cpu) {
    let addr = M::effective(cpu);
    let value = cpu.read(addr).wrapping_add(1);
    cpu.write(addr, value);
    cpu.update_nz(value);
}

pub(crate) fn dec<M: Effective>(cpu: &mut Cpu) {
    let addr = M::effective(cpu);
    let value = cpu.read(addr).wrapping_sub(1);
    cpu.write(addr, value);
    cpu.update_nz(value);
}

pub(crate) fn inx(cpu: &mut Cpu) {
    cpu.regs.x = cpu.regs.x.wrapping_add(1);
    cpu.update_nz(cpu.regs.x);
}

pub(crate) fn iny(cpu: &mut Cpu) {
    cpu.regs.y = cpu.regs.y.wrapping_add(1);
    cpu.update_nz(cpu.regs.y);
}

pub(crate) fn dex(cpu: &mut Cpu) {
    cpu.regs.x = cpu.regs.x.wrapping_sub(1);
    cpu.update_nz(cpu.regs.x);
}

pub(crate) fn dey(cpu: &mut Cpu) {
    cpu.regs.y = cpu.regs.y.wrapping_sub(1);
    cpu.update_nz(cpu.regs.y);
}

// Branches

fn branch<M: Effective>(cpu: &mut Cpu, flag: Status, taken_when: bool) {
    let target = M::effective(cpu);
    if cpu.test_flag(flag) == taken_when {
        cpu.regs.pc = target;
    }
}

pub(crate) fn bpl<M: Effective>(cpu: &mut Cpu) {
    branch::<M>(cpu, Status::NEGATIVE, false);
}

pub(crate) fn bmi<M: Effective>(cpu: &mut Cpu) {
    branch::<M>(cpu, Status::NEGATIVE, true);
}

pub(crate) fn bvc<M: Effective>(cpu: &mut Cpu) {
    branch::<M>(cpu, Status::OVERFLOW, false);
}

pub(crate) fn bvs<M: Effective>(cpu: &mut Cpu) {
    branch::<M>(cpu, Status::OVERFLOW, true);
}

pub(crate) fn bcc<M: Effective>(cpu: &mut Cpu) {
    branch::<M>(cpu, Status::CARRY, false);
}

pub(crate) fn bcs<M: Effective>(cpu: &mut Cpu) {
    branch::<M>(cpu, Status::CARRY, true);
}

pub(crate) fn bne<M: Effective>(cpu: &mut Cpu) {
    branch::<M>(cpu, Status::ZERO, false);
}

pub(crate) fn beq<M: Effective>(cpu: &mut Cpu) {
    branch::<M>(cpu, Status::ZERO, true);
}

// Jumps, subroutines and interrupts

pub(crate) fn jmp<M: Effective>(cpu: &mut Cpu) {
    cpu.regs.pc = M::effective(cpu);
}

/// Pushes the address of the JSR's last byte; RTS adds the one back.
pub(crate) fn jsr<M: Effective>(cpu: &mut Cpu) {
    let target = M::effective(cpu);
    cpu.push_word(cpu.regs.pc.wrapping_sub(1));
    cpu.regs.pc = target;
}

pub(crate) fn rts(cpu: &mut Cpu) {
    cpu.regs.pc = cpu.pop_word().wrapping_add(1);
}

pub(crate) fn rti(cpu: &mut Cpu) {
    cpu.regs.status = Status::from_bits_retain(cpu.pop()) - Status::BREAK;
    cpu.regs.pc = cpu.pop_word();
}

pub(crate) fn brk(cpu: &mut Cpu) {
    cpu.interrupt(Interrupts::BRK, IRQ_VECTOR, true);
    cpu.set_flag(Status::BREAK);
}

// Stack

pub(crate) fn pha(cpu: &mut Cpu) {
    cpu.push(cpu.regs.a);
}

pub(crate) fn php(cpu: &mut Cpu) {
    cpu.push((cpu.regs.status | Status::BREAK).bits());
}

pub(crate) fn pla(cpu: &mut Cpu) {
    cpu.regs.a = cpu.pop();
    cpu.update_nz(cpu.regs.a);
}

pub(crate) fn plp(cpu: &mut Cpu) {
    cpu.regs.status = Status::from_bits_retain(cpu.pop()) - Status::BREAK;
}

// Transfers

pub(crate) fn tax(cpu: &mut Cpu) {
    cpu.regs.x = cpu.regs.a;
    cpu.update_nz(cpu.regs.x);
}

pub(crate) fn tay(cpu: &mut Cpu) {
    cpu.regs.y = cpu.regs.a;
    cpu.update_nz(cpu.regs.y);
}

pub(crate) fn txa(cpu: &mut Cpu) {
    cpu.regs.a = cpu.regs.x;
    cpu.update_nz(cpu.regs.a);
}

pub(crate) fn tya(cpu: &mut Cpu) {
    cpu.regs.a = cpu.regs.y;
    cpu.update_nz(cpu.regs.a);
}

pub(crate) fn tsx(cpu: &mut Cpu) {
    cpu.regs.x = cpu.regs.sp;
    cpu.update_nz(cpu.regs.x);
}

pub(crate) fn txs(cpu: &mut Cpu) {
    cpu.regs.sp = cpu.regs.x;
}

// Flags

pub(crate) fn clc(cpu: &mut Cpu) {
    cpu.clear_flag(Status::CARRY);
}

pub(crate) fn sec(cpu: &mut Cpu) {
    cpu.set_flag(Status::CARRY);
}

pub(crate) fn cli(cpu: &mut Cpu) {
    cpu.clear_flag(Status::INTERRUPT);
}

pub(crate) fn sei(cpu: &mut Cpu) {
    cpu.set_flag(Status::INTERRUPT);
}

pub(crate) fn clv(cpu: &mut Cpu) {
    cpu.clear_flag(Status::OVERFLOW);
}

pub(crate) fn cld(cpu: &mut Cpu) {
    cpu.clear_flag(Status::DECIMAL);
}

pub(crate) fn sed(cpu: &mut Cpu) {
    cpu.set_flag(Status::DECIMAL);
}

pub(crate) fn nop(_cpu: &mut Cpu) {}

/// Table filler for unassigned opcodes. `Cpu::step` rejects these before
/// dispatch, so reaching this means the table was bypassed.
pub(crate) fn undefined(cpu: &mut Cpu) {
    log::error!(
        "Undefined opcode handler reached at PC: 0x{:04X}",
        cpu.regs.pc.wrapping_sub(1)
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::addressing::{Accumulator, Immediate, ZeroPage};
    use crate::memory::Ram;

    fn setup(program: &[u8]) -> Cpu {
        let mut cpu = Cpu::new();
        let mut ram = Ram::new(0x1_0000);
        ram.load(0x0200, program).unwrap();
        cpu.register_device(0x0000, ram).unwrap();
        cpu.regs.pc = 0x0200;
        cpu
    }

    #[test]
    fn adc_signed_overflow() {
        let mut cpu = setup(&[0x50]);
        cpu.regs.a = 0x50;
        adc::<Immediate>(&mut cpu);
        assert_eq!(cpu.regs.a, 0xA0);
        assert!(cpu.test_flag(Status::OVERFLOW));
        assert!(cpu.test_flag(Status::NEGATIVE));
        assert!(!cpu.test_flag(Status::CARRY));
        assert!(!cpu.test_flag(Status::ZERO));
    }

    #[test]
    fn adc_unsigned_carry_out() {
        let mut cpu = setup(&[0xB0]);
        cpu.regs.a = 0x50;
        adc::<Immediate>(&mut cpu);
        assert_eq!(cpu.regs.a, 0x00);
        assert!(!cpu.test_flag(Status::OVERFLOW));
        assert!(cpu.test_flag(Status::CARRY));
        assert!(cpu.test_flag(Status::ZERO));
    }

    #[test]
    fn adc_adds_incoming_carry() {
        let mut cpu = setup(&[0x01]);
        cpu.regs.a = 0x01;
        cpu.set_flag(Status::CARRY);
        adc::<Immediate>(&mut cpu);
        assert_eq!(cpu.regs.a, 0x03);
        assert!(!cpu.test_flag(Status::CARRY));
    }

    #[test]
    fn sbc_honours_clear_carry_as_borrow() {
        let mut cpu = setup(&[0x01, 0x01]);
        cpu.regs.a = 0x05;
        cpu.set_flag(Status::CARRY);
        sbc::<Immediate>(&mut cpu);
        assert_eq!(cpu.regs.a, 0x04);
        assert!(cpu.test_flag(Status::CARRY));

        cpu.clear_flag(Status::CARRY);
        sbc::<Immediate>(&mut cpu);
        assert_eq!(cpu.regs.a, 0x02);
        assert!(cpu.test_flag(Status::CARRY));
    }

    #[test]
    fn sbc_borrow_and_overflow() {
        let mut cpu = setup(&[0x01, 0x01]);
        cpu.regs.a = 0x00;
        cpu.set_flag(Status::CARRY);
        sbc::<Immediate>(&mut cpu);
        assert_eq!(cpu.regs.a, 0xFF);
        assert!(!cpu.test_flag(Status::CARRY));
        assert!(cpu.test_flag(Status::NEGATIVE));
        assert!(!cpu.test_flag(Status::OVERFLOW));

        cpu.regs.a = 0x80;
        cpu.set_flag(Status::CARRY);
        sbc::<Immediate>(&mut cpu);
        assert_eq!(cpu.regs.a, 0x7F);
        assert!(cpu.test_flag(Status::OVERFLOW));
        assert!(cpu.test_flag(Status::CARRY));
    }

    #[test]
    fn compare_sets_carry_without_borrow() {
        let mut cpu = setup(&[0x03, 0x05, 0x07]);
        cpu.regs.a = 0x05;
        cmp::<Immediate>(&mut cpu);
        assert!(cpu.test_flag(Status::CARRY));
        assert!(!cpu.test_flag(Status::ZERO));

        cmp::<Immediate>(&mut cpu);
        assert!(cpu.test_flag(Status::CARRY));
        assert!(cpu.test_flag(Status::ZERO));

        cmp::<Immediate>(&mut cpu);
        assert!(!cpu.test_flag(Status::CARRY));
        assert!(cpu.test_flag(Status::NEGATIVE));
        assert_eq!(cpu.regs.a, 0x05);
    }

    #[test]
    fn cpx_and_cpy_use_their_registers() {
        let mut cpu = setup(&[0x10, 0x20]);
        cpu.regs.x = 0x10;
        cpu.regs.y = 0x10;
        cpx::<Immediate>(&mut cpu);
        assert!(cpu.test_flag(Status::ZERO));
        cpy::<Immediate>(&mut cpu);
        assert!(!cpu.test_flag(Status::CARRY));
    }

    #[test]
    fn bit_copies_operand_bits() {
        let mut cpu = setup(&[0x10]);
        cpu.write(0x0010, 0xC0);
        cpu.regs.a = 0x01;
        bit::<ZeroPage>(&mut cpu);
        assert!(cpu.test_flag(Status::ZERO));
        assert!(cpu.test_flag(Status::NEGATIVE));
        assert!(cpu.test_flag(Status::OVERFLOW));
    }

    #[test]
    fn shifts_on_accumulator() {
        let mut cpu = setup(&[]);
        cpu.regs.a = 0x81;
        asl::<Accumulator>(&mut cpu);
        assert_eq!(cpu.regs.a, 0x02);
        assert!(cpu.test_flag(Status::CARRY));

        lsr::<Accumulator>(&mut cpu);
        assert_eq!(cpu.regs.a, 0x01);
        assert!(!cpu.test_flag(Status::CARRY));

        lsr::<Accumulator>(&mut cpu);
        assert_eq!(cpu.regs.a, 0x00);
        assert!(cpu.test_flag(Status::CARRY));
        assert!(cpu.test_flag(Status::ZERO));
    }

    #[test]
    fn rotates_feed_old_carry() {
        let mut cpu = setup(&[]);
        cpu.regs.a = 0x80;
        cpu.clear_flag(Status::CARRY);
        rol::<Accumulator>(&mut cpu);
        assert_eq!(cpu.regs.a, 0x00);
        assert!(cpu.test_flag(Status::CARRY));

        rol::<Accumulator>(&mut cpu);
        assert_eq!(cpu.regs.a, 0x01);
        assert!(!cpu.test_flag(Status::CARRY));

        ror::<Accumulator>(&mut cpu);
        assert_eq!(cpu.regs.a, 0x00);
        assert!(cpu.test_flag(Status::CARRY));

        ror::<Accumulator>(&mut cpu);
        assert_eq!(cpu.regs.a, 0x80);
        assert!(cpu.test_flag(Status::NEGATIVE));
        assert!(!cpu.test_flag(Status::CARRY));
    }

    #[test]
    fn memory_shift_writes_back() {
        let mut cpu = setup(&[0x40]);
        cpu.write(0x0040, 0x41);
        asl::<ZeroPage>(&mut cpu);
        assert_eq!(cpu.read(0x0040), 0x82);
        assert!(cpu.test_flag(Status::NEGATIVE));
        assert_eq!(cpu.regs.pc, 0x0201);
    }

    #[test]
    fn inc_dec_wrap_and_keep_carry() {
        let mut cpu = setup(&[0x40, 0x40]);
        cpu.write(0x0040, 0xFF);
        cpu.set_flag(Status::CARRY);
        inc::<ZeroPage>(&mut cpu);
        assert_eq!(cpu.read(0x0040), 0x00);
        assert!(cpu.test_flag(Status::ZERO));
        assert!(cpu.test_flag(Status::CARRY));

        dec::<ZeroPage>(&mut cpu);
        assert_eq!(cpu.read(0x0040), 0xFF);
        assert!(cpu.test_flag(Status::NEGATIVE));

        cpu.regs.x = 0x00;
        dex(&mut cpu);
        assert_eq!(cpu.regs.x, 0xFF);
        inx(&mut cpu);
        assert_eq!(cpu.regs.x, 0x00);
        assert!(cpu.test_flag(Status::ZERO));
    }

    #[test]
    fn txs_leaves_flags_alone() {
        let mut cpu = setup(&[]);
        cpu.regs.x = 0x00;
        txs(&mut cpu);
        assert_eq!(cpu.regs.sp, 0x00);
        assert!(!cpu.test_flag(Status::ZERO));

        tsx(&mut cpu);
        assert!(cpu.test_flag(Status::ZERO));
    }

    #[test]
    fn php_sets_break_and_plp_drops_it() {
        let mut cpu = setup(&[]);
        cpu.set_flag(Status::CARRY | Status::NEGATIVE);
        php(&mut cpu);
        assert_eq!(cpu.read(0x01FF), 0x91);

        cpu.regs.status = Status::empty();
        plp(&mut cpu);
        assert_eq!(cpu.regs.status, Status::CARRY | Status::NEGATIVE);
    }
}
