//! Reduces 20 modulo 6 without ever looking at either number.

use homomod::prelude::*;

fn main() -> homomod::Result<()> {
    // Parameters a deployment would agree on first
    let context = ContextBuilder::<Bgv>::new()
        .m(4369)
        .p(2)
        .bits(300)
        .c(3)
        .build()?;
    println!("{context}");

    // 20 < 6^2 needs 5 bits, plus a zero guard bit
    const WIDTH: usize = 6;
    let (a, m) = (20, 6);

    // The bound comes from public parameters only: any 5-bit dividend,
    // any modulus of at least 6
    let bound = IterationBound::worst_case(5, 6)?;
    let reducer = ModularReducer::new(bound);

    let scheme = ClearScheme::new(1);
    let ca = EncryptedBinaryNumber::encrypt(&scheme, &[a], WIDTH)?;
    let cm = EncryptedBinaryNumber::encrypt(&scheme, &[m], WIDTH)?;
    let r = reducer.run(ca, &cm)?.decrypt(&scheme)?;
    println!("{a} mod {m} = {} after {} iterations", r[0], bound.iterations());
    assert_eq!(r, vec![a % m]);

    // Under real encryption the noise grows with every iteration, so keep it small
    let scheme = Gf2Scheme::generate(Parameters::new(256, 32, 1, 32)?)?;
    let ca = EncryptedBinaryNumber::encrypt(&scheme, &[3], 3)?;
    let cm = EncryptedBinaryNumber::encrypt(&scheme, &[2], 3)?;
    let r = ModularReducer::new(IterationBound::exact(2))
        .run(ca, &cm)?
        .decrypt(&scheme)?;
    println!("3 mod 2 = {} under encryption", r[0]);
    assert_eq!(r, vec![1]);

    Ok(())
}
