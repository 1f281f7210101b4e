#![no_main]

use libfuzzer_sys::fuzz_target;
use the_args::{
  BasicExtractor,
  CharStream,
  Extractor,
  QuoteEscapeExtractor,
  QuoteEscapeOptions,
  Token,
  extract::extract_all,
};

const MAX_INPUT_BYTES: usize = 4 * 1024;

fuzz_target!(|data: &[u8]| {
  let Some((&flags, rest)) = data.split_first() else {
    return;
  };
  if rest.len() > MAX_INPUT_BYTES {
    return;
  }
  let Ok(input) = std::str::from_utf8(rest) else {
    return;
  };

  let extractor = QuoteEscapeExtractor::new(QuoteEscapeOptions {
    disable_single_quote: flags & 1 != 0,
    disable_double_quote: flags & 2 != 0,
    disable_escape:       flags & 4 != 0,
  });

  // Every call makes progress, and an exhausted stream stays exhausted.
  let mut stream = CharStream::new(input);
  loop {
    let before = stream.pos();
    match extractor.extract(&mut stream) {
      Ok(Token::Arg(_)) => assert!(stream.pos() > before),
      Ok(Token::Done) => {
        assert!(stream.rest().trim().is_empty());
        assert!(extractor.extract(&mut stream).is_ok_and(|token| token.is_done()));
        break;
      },
      Err(_) => break,
    }
  }

  if !input.contains(['\'', '"', '\\']) {
    assert_eq!(
      extract_all(&extractor, input),
      extract_all(&BasicExtractor, input)
    );
  }
});
