use rand::Rng;

use crate::constants::GLYPH_SIZE;
use crate::error::Result;
use crate::keypad::Keypad;
use crate::state::State;

// Every operation runs after pc has been moved past its own opcode, so pc already points at
// the next instruction and skipping means moving it forward one more instruction.

/// clear
pub fn clr(state: &mut State) -> Result<()> {
    state.frame_buffer.clear();
    state.draw_flag = true;
    Ok(())
}

/// PC = STACK.pop()
pub fn rts(state: &mut State) -> Result<()> {
    state.pc = state.pop()?;
    Ok(())
}

/// PC = addr
pub fn jump(state: &mut State, addr: u16) -> Result<()> {
    state.pc = addr;
    Ok(())
}

/// STACK.push(PC); PC = addr
pub fn call(state: &mut State, addr: u16) -> Result<()> {
    state.push(state.pc)?;
    state.pc = addr;
    Ok(())
}

/// if Vx == nn then pc += 2
pub fn ske(state: &mut State, x: u8, nn: u8) -> Result<()> {
    state.skip_if(state.v[x as usize] == nn);
    Ok(())
}

/// if Vx != nn then pc += 2
pub fn skne(state: &mut State, x: u8, nn: u8) -> Result<()> {
    state.skip_if(state.v[x as usize] != nn);
    Ok(())
}

/// if Vx == Vy then pc += 2
pub fn skre(state: &mut State, x: u8, y: u8) -> Result<()> {
    state.skip_if(state.v[x as usize] == state.v[y as usize]);
    Ok(())
}

/// Vx = nn
pub fn load(state: &mut State, x: u8, nn: u8) -> Result<()> {
    state.v[x as usize] = nn;
    Ok(())
}

/// Vx += nn
/// Wraps on overflow; VF is left alone
pub fn add(state: &mut State, x: u8, nn: u8) -> Result<()> {
    state.v[x as usize] = state.v[x as usize].wrapping_add(nn);
    Ok(())
}

/// Vx = Vy
pub fn mv(state: &mut State, x: u8, y: u8) -> Result<()> {
    state.v[x as usize] = state.v[y as usize];
    Ok(())
}

/// Vx |= Vy
pub fn or(state: &mut State, x: u8, y: u8) -> Result<()> {
    state.v[x as usize] |= state.v[y as usize];
    Ok(())
}

/// Vx &= Vy
pub fn and(state: &mut State, x: u8, y: u8) -> Result<()> {
    state.v[x as usize] &= state.v[y as usize];
    Ok(())
}

/// Vx ^= Vy
pub fn xor(state: &mut State, x: u8, y: u8) -> Result<()> {
    state.v[x as usize] ^= state.v[y as usize];
    Ok(())
}

/// Vx += Vy; VF = overflow
pub fn addr(state: &mut State, x: u8, y: u8) -> Result<()> {
    let (res, over) = state.v[x as usize].overflowing_add(state.v[y as usize]);
    state.v[x as usize] = res;
    state.set_flag(over);
    Ok(())
}

/// Vx -= Vy; VF = !borrow
pub fn sub(state: &mut State, x: u8, y: u8) -> Result<()> {
    let (res, borrow) = state.v[x as usize].overflowing_sub(state.v[y as usize]);
    state.v[x as usize] = res;
    state.set_flag(!borrow);
    Ok(())
}

/// Vx >>= 1; VF = lsb
pub fn shr(state: &mut State, x: u8) -> Result<()> {
    let vx = state.v[x as usize];
    state.set_flag(vx & 0x1 == 1);
    state.v[x as usize] = vx >> 1;
    Ok(())
}

/// Vx = Vy - Vx; VF = !borrow
pub fn subn(state: &mut State, x: u8, y: u8) -> Result<()> {
    let (res, borrow) = state.v[y as usize].overflowing_sub(state.v[x as usize]);
    state.v[x as usize] = res;
    state.set_flag(!borrow);
    Ok(())
}

/// Vx <<= 1; VF = msb
pub fn shl(state: &mut State, x: u8) -> Result<()> {
    let vx = state.v[x as usize];
    state.set_flag(vx >> 7 == 1);
    state.v[x as usize] = vx << 1;
    Ok(())
}

/// if Vx != Vy then pc += 2
pub fn skrne(state: &mut State, x: u8, y: u8) -> Result<()> {
    state.skip_if(state.v[x as usize] != state.v[y as usize]);
    Ok(())
}

/// I = addr
pub fn loadi(state: &mut State, addr: u16) -> Result<()> {
    state.i = addr;
    Ok(())
}

/// PC = V0 + addr
pub fn jumpi(state: &mut State, addr: u16) -> Result<()> {
    state.pc = u16::from(state.v[0x0]) + addr;
    Ok(())
}

/// Vx = rand_byte & nn
pub fn rand<R: Rng + ?Sized>(state: &mut State, x: u8, nn: u8, rng: &mut R) -> Result<()> {
    let rand_byte: u8 = rng.gen();
    state.v[x as usize] = rand_byte & nn;
    Ok(())
}

/// draw_sprite(x=Vx y=Vy size=n)
/// XORs the sprite in memory I..I+n onto the FrameBuffer at Vx, Vy, wrapping at the edges.
/// Sets VF if any pixels were erased
pub fn draw(state: &mut State, x: u8, y: u8, n: u8) -> Result<()> {
    let origin_x = state.v[x as usize] as usize;
    let origin_y = state.v[y as usize] as usize;
    let sprite = state.memory.bytes(state.i as usize, n as usize)?;

    // the origin is read before VF is cleared, so DFYN and DXFN draw at the old VF
    state.v[0xF] = 0;
    for (row, byte) in sprite.iter().enumerate() {
        for bit in 0..8 {
            if (byte >> (7 - bit)) & 1 == 1
                && state.frame_buffer.flip(origin_x + bit, origin_y + row)
            {
                state.v[0xF] = 1;
            }
        }
    }

    state.draw_flag = true;
    Ok(())
}

/// if Vx.pressed then pc += 2
pub fn skpr(state: &mut State, x: u8, keypad: &Keypad) -> Result<()> {
    state.skip_if(keypad.is_pressed(state.v[x as usize]));
    Ok(())
}

/// if !Vx.pressed then pc += 2
pub fn skup(state: &mut State, x: u8, keypad: &Keypad) -> Result<()> {
    state.skip_if(!keypad.is_pressed(state.v[x as usize]));
    Ok(())
}

/// Vx = DT
pub fn moved(state: &mut State, x: u8) -> Result<()> {
    state.v[x as usize] = state.delay_timer;
    Ok(())
}

/// await keypress for Vx
/// Execution halts until the key is supplied; see `Chip8::step`
pub fn keyd(state: &mut State, x: u8) -> Result<()> {
    state.register_needing_key = Some(x);
    Ok(())
}

/// DT = Vx
pub fn loads(state: &mut State, x: u8) -> Result<()> {
    state.delay_timer = state.v[x as usize];
    Ok(())
}

/// ST = Vx
pub fn ld(state: &mut State, x: u8) -> Result<()> {
    state.sound_timer = state.v[x as usize];
    Ok(())
}

/// I += Vx
pub fn addi(state: &mut State, x: u8) -> Result<()> {
    state.i = state.i.wrapping_add(u16::from(state.v[x as usize]));
    Ok(())
}

/// I = Vx * 5
/// Set I to the memory address of the glyph for Vx
/// See constants::SPRITE_SHEET for more details
pub fn ldspr(state: &mut State, x: u8) -> Result<()> {
    state.i = u16::from(state.v[x as usize]) * GLYPH_SIZE;
    Ok(())
}

/// mem[I..I+3] = bcd(Vx)
pub fn bcd(state: &mut State, x: u8) -> Result<()> {
    let vx = state.v[x as usize];
    let bcd = [vx / 100, vx / 10 % 10, vx % 10];
    state.memory.write_bytes(state.i as usize, &bcd)
}

/// mem[I..=I+x] = V0..=Vx; I += x + 1
pub fn stor(state: &mut State, x: u8) -> Result<()> {
    let count = x as usize + 1;
    state
        .memory
        .write_bytes(state.i as usize, &state.v[..count])?;
    state.i += count as u16;
    Ok(())
}

/// V0..=Vx = mem[I..=I+x]; I += x + 1
pub fn read(state: &mut State, x: u8) -> Result<()> {
    let count = x as usize + 1;
    let bytes = state.memory.bytes(state.i as usize, count)?;
    state.v[..count].copy_from_slice(bytes);
    state.i += count as u16;
    Ok(())
}
