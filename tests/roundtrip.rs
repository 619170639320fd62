use propeller2_asm::isa::p2::{Shape, COND_ALWAYS, COND_SHIFT, C_BIT, OPCODES, Z_BIT};
use propeller2_asm::{assemble, disassemble, disassemble_range, AsmOptions, Source};
use pretty_assertions::assert_eq;

fn reassemble(src: &str) -> Vec<u32> {
    let a = assemble(Source::Text(src.to_string()), &AsmOptions::default()).unwrap();
    assert!(!a.has_errors(), "{src}\n{}", a.listing.render(false));
    a.words()
}

#[test]
fn disassembly_reassembles_to_the_same_word() {
    let words = [
        0x0000_0000, // NOP
        0xF600_0202, // MOV D,S
        0xF604_0202, // MOV D,#S
        0xC114_0601, // IF_C ADD D,#S WC
        0xFB6C_03FF, // DJNZ back to itself
        0xFD90_0001, // JMP #A relative
        0xFD80_0400, // JMP #\A absolute
        0xFB04_0361, // RDLONG D,PTRA++
        0xFC64_0382, // WRLONG D,PTRB[2]
        0xFEC0_0400, // LOC PTRA,#\A
        0xFD7D_E06F, // MODCZ _SET,_CLR WCZ
        0xFF00_0091, // AUGS #n
    ];
    for w in words {
        let text = disassemble(w, 0).source;
        assert_eq!(reassemble(&format!("  {text}")), vec![w], "{text}");
    }
}

// Every descriptor with zero D/S fields, unconditional, carrying the first
// suffix it accepts when one is mandatory.
#[test]
fn every_opcode_reassembles() {
    let mut mismatches = Vec::new();
    for desc in OPCODES {
        let mut word = desc.bits;
        if desc.conditional() {
            word |= COND_ALWAYS << COND_SHIFT;
        }
        if desc.flags.required {
            if let Some(flag) = desc.flags.allowed.iter().next() {
                let (c, z) = flag.cz();
                if c {
                    word |= C_BIT & !desc.mask;
                }
                if z {
                    word |= Z_BIT & !desc.mask;
                }
            }
        }
        // D,D forms carry identical fields; zero already satisfies that
        assert!(desc.shape != Shape::DDup || (word >> 9) & 0x1FF == word & 0x1FF);

        let text = disassemble(word, 0).source;
        let a = assemble(Source::Text(format!("  {text}\n")), &AsmOptions::default()).unwrap();
        if a.has_errors() || a.words() != vec![word] {
            mismatches.push(format!("{} {word:08x} -> {text:?} -> {:08x?}", desc.mnemonic, a.words()));
        }
    }
    assert!(mismatches.is_empty(), "{}", mismatches.join("\n"));
}

#[test]
fn augmented_pair_reassembles() {
    let words = [0xFF00_0091, 0xF604_0345];
    let texts: Vec<String> = disassemble_range(&words, 0).map(|r| r.source).collect();
    assert_eq!(texts[1], "MOV $001, ##$12345");
    // the merged form alone regenerates both words
    assert_eq!(reassemble(&format!("  {}", texts[1])), words.to_vec());
}

#[test]
fn hub_branch_round_trips_at_its_address() {
    let text = disassemble(0xFD9F_FFF8, 0x404).source;
    assert_eq!(text, "JMP #$00400");
    assert_eq!(reassemble(&format!("  orgh $404\n  {text}")), vec![0xFD9F_FFF8]);
}
