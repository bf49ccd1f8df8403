use std::io::Read;

use rheap::HeapArena;

/// Waits until the user presses ENTER, when running with `--step`.
/// Handy for reading each layout before the next operation changes it.
fn block_until_enter_pressed(step: bool) {
  if step {
    println!("\n>>> Press ENTER to continue...");
    let _ = std::io::stdin().bytes().next();
  }
}

/// Prints the block map and the free summary side by side.
fn print_layout(
  label: &str,
  arena: &HeapArena,
) -> anyhow::Result<()> {
  println!("[{label}] {}", arena.free_summary()?);
  for line in arena.block_map()?.to_string().lines() {
    println!("    {line}");
  }
  Ok(())
}

fn main() -> anyhow::Result<()> {
  let step = std::env::args().any(|arg| arg == "--step");

  // A 128-byte arena: 4 bytes of head field, 124 bytes for blocks.
  let mut arena = HeapArena::create(128)?;
  print_layout("start", &arena)?;
  block_until_enter_pressed(step);

  // --------------------------------------------------------------------
  // 1) Three allocations land back to back after the head field.
  //    Each one costs its payload plus a 12-byte header.
  // --------------------------------------------------------------------
  let first = arena.allocate(8).map(Option::unwrap_or_default)?;
  let second = arena.allocate(20).map(Option::unwrap_or_default)?;
  let third = arena.allocate(4).map(Option::unwrap_or_default)?;
  println!("\n[1] allocate 8, 20, 4 -> {first}, {second}, {third}");
  print_layout("1", &arena)?;
  block_until_enter_pressed(step);

  // --------------------------------------------------------------------
  // 2) Fill the payloads so the raw dump shows where they are.
  // --------------------------------------------------------------------
  arena.fill(first, 8, 0xAA)?;
  arena.fill(second, 20, 0xBB)?;
  arena.fill(third, 4, 0xCC)?;
  println!("\n[2] payloads filled with AA, BB, CC");
  println!("{}", arena.dump());
  block_until_enter_pressed(step);

  // --------------------------------------------------------------------
  // 3) Free the middle block. Its 32 bytes become a gap between the
  //    first and third blocks; the bytes themselves stay as they were.
  // --------------------------------------------------------------------
  arena.free(second)?;
  println!("\n[3] freed {second}");
  print_layout("3", &arena)?;
  println!("{}", arena.usage_summary()?);
  block_until_enter_pressed(step);

  // --------------------------------------------------------------------
  // 4) A small request takes the first gap that fits, which is the hole
  //    left by the freed block, not the larger tail.
  // --------------------------------------------------------------------
  let fourth = arena.allocate(6).map(Option::unwrap_or_default)?;
  println!(
    "\n[4] allocate 6 -> {fourth} ({})",
    if fourth == second {
      "reused the freed hole"
    } else {
      "placed elsewhere"
    }
  );
  print_layout("4", &arena)?;
  block_until_enter_pressed(step);

  // --------------------------------------------------------------------
  // 5) Requests that would not leave the 16-byte margin are refused,
  //    and so is anything no single gap can hold.
  // --------------------------------------------------------------------
  println!("\n[5] allocate 112 -> {:?}", arena.allocate(112)?);
  println!("[5] allocate 80  -> {:?}", arena.allocate(80)?);

  // --------------------------------------------------------------------
  // 6) Freeing something that is not a live allocation is rejected.
  // --------------------------------------------------------------------
  match arena.free(second + 1) {
    Ok(()) => println!("\n[6] unexpected success"),
    Err(error) => println!("\n[6] free({}) rejected: {error}", second + 1),
  }

  arena.destroy();
  println!("\n[7] arena released");

  Ok(())
}
