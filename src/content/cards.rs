//! Raw row coercion: delimited-text rows arrive with wildly inconsistent
//! headers across source files, so every field resolves through an alias
//! list, case-insensitively, with sensible fallbacks. A malformed row never
//! errors out the load; missing fields default to empty.

use std::collections::{HashMap, HashSet};

use sha2::{Digest, Sha256};

use crate::content::normalize::canonical_trigger;
use crate::domain::{Card, Outcome, RuleFamily};

/// One ingested row before coercion, keyed by its original headers.
#[derive(Debug, Clone)]
pub struct RawRow {
  /// File name the row came from, used for pack scoping.
  pub source: String,
  pub fields: HashMap<String, String>,
}

const ALIAS_CARD_ID: &[&str] =
  &["CardId", "Card ID", "ID", "Id", "id", "cardId", "card_id"];
const ALIAS_OUTCOME: &[&str] = &["Outcome", "Result", "Mutation", "Mut"];
const ALIAS_TRIGGER: &[&str] =
  &["Trigger", "Trigger/Structure", "Structure", "Preposition"];
const ALIAS_RULE_FAMILY: &[&str] = &["RuleFamily", "Rule Family", "Family"];
const ALIAS_RULE_CATEGORY: &[&str] =
  &["RuleCategory", "Rule Category", "Category"];
const ALIAS_BASE: &[&str] =
  &["Base", "Radical", "Word", "Base word", "BaseWord"];
const ALIAS_WORD_CATEGORY: &[&str] =
  &["WordCategory", "Word Category", "POS", "Part of speech"];
const ALIAS_BEFORE: &[&str] =
  &["Before", "PromptBefore", "Left", "SentenceBefore"];
const ALIAS_AFTER: &[&str] = &["After", "PromptAfter", "Right", "SentenceAfter"];
const ALIAS_ANSWER: &[&str] = &["Answer", "Expected", "Mutated", "Target"];
const ALIAS_WHY: &[&str] = &["Why", "Note", "Rule", "Explanation", "Notes"];
const ALIAS_TRANSLATE: &[&str] =
  &["Translate", "Translation", "Gloss", "Meaning"];

/// Simple prepositions that imply the Preposition rule category when no
/// category column is present.
const PREPOSITIONS: &[&str] = &[
  "am", "ar", "at", "dan", "dros", "tros", "drwy", "trwy", "gan", "heb",
  "hyd", "i", "o", "tan", "wrth", "yng", "yn", "gyda", "hefo", "â",
];

fn lookup(fields: &HashMap<String, String>, aliases: &[&str]) -> String {
  for alias in aliases {
    for (key, value) in fields {
      if key.trim().eq_ignore_ascii_case(alias) {
        let v = value.trim();
        if !v.is_empty() {
          return v.to_string();
        }
      }
    }
  }
  String::new()
}

fn fallback_id(rule_category: &str, trigger: &str, base: &str) -> String {
  let mut hasher = Sha256::new();
  hasher.update(rule_category.as_bytes());
  hasher.update(b":");
  hasher.update(trigger.as_bytes());
  hasher.update(b":");
  hasher.update(base.as_bytes());
  let digest = hex::encode(hasher.finalize());
  format!("card_{}", &digest[..12])
}

/// Coerce one raw row into a card. Never fails; unknown values fall back.
pub fn coerce_row(row: &RawRow) -> Card {
  let outcome_raw = lookup(&row.fields, ALIAS_OUTCOME);
  let outcome_clean: String = outcome_raw
    .chars()
    .filter(|c| *c != '"' && *c != '\'')
    .collect();
  let outcome =
    Outcome::from_str(outcome_clean.trim()).unwrap_or(Outcome::None);

  let family_raw = lookup(&row.fields, ALIAS_RULE_FAMILY);
  let family_first = family_raw.split(',').next().unwrap_or("").trim();
  let rule_family = RuleFamily::from_str(family_first)
    .unwrap_or_else(|| RuleFamily::from_outcome(outcome));

  let trigger = lookup(&row.fields, ALIAS_TRIGGER);
  let trigger_canon = canonical_trigger(&trigger);

  let prep_set: HashSet<String> =
    PREPOSITIONS.iter().map(|p| canonical_trigger(p)).collect();
  let mut rule_category = lookup(&row.fields, ALIAS_RULE_CATEGORY);
  if rule_category.is_empty() && prep_set.contains(trigger_canon.as_str()) {
    rule_category = "Preposition".to_string();
  }

  let base = lookup(&row.fields, ALIAS_BASE);
  let answer = lookup(&row.fields, ALIAS_ANSWER);

  let explicit_id = lookup(&row.fields, ALIAS_CARD_ID);
  let id = if explicit_id.is_empty() {
    fallback_id(&rule_category, &trigger, &base)
  } else {
    explicit_id
  };

  Card {
    id,
    rule_family,
    rule_category,
    trigger,
    trigger_canon,
    base,
    answer,
    before: lookup(&row.fields, ALIAS_BEFORE),
    after: lookup(&row.fields, ALIAS_AFTER),
    outcome,
    word_category: lookup(&row.fields, ALIAS_WORD_CATEGORY),
    why: lookup(&row.fields, ALIAS_WHY),
    translate: lookup(&row.fields, ALIAS_TRANSLATE),
    source: row.source.clone(),
  }
}

/// Coerce a batch of rows, dropping only rows with no answer at all.
pub fn load(rows: &[RawRow]) -> Vec<Card> {
  let mut cards = Vec::with_capacity(rows.len());
  for row in rows {
    let card = coerce_row(row);
    if card.answer.is_empty() && card.base.is_empty() {
      tracing::warn!(source = %row.source, "skipping row with no base or answer");
      continue;
    }
    cards.push(card);
  }
  tracing::info!("loaded {} cards from {} rows", cards.len(), rows.len());
  cards
}

fn row(source: &str, pairs: &[(&str, &str)]) -> RawRow {
  RawRow {
    source: source.to_string(),
    fields: pairs
      .iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect(),
  }
}

/// Built-in starter deck, used when the data directory yields nothing.
pub fn seed_rows() -> Vec<RawRow> {
  vec![
    row(
      "prep.csv",
      &[
        ("Trigger", "i"),
        ("Base", "Caerdydd"),
        ("Answer", "Gaerdydd"),
        ("Before", "Dw i'n mynd i"),
        ("After", "yfory."),
        ("Outcome", "SM"),
        ("Why", "The preposition 'i' causes soft mutation."),
        ("Translate", "I'm going to Cardiff tomorrow."),
      ],
    ),
    row(
      "prep.csv",
      &[
        ("Trigger", "o"),
        ("Base", "Bangor"),
        ("Answer", "Fangor"),
        ("Before", "Mae hi'n dod o"),
        ("After", "."),
        ("Outcome", "SM"),
        ("Why", "The preposition 'o' causes soft mutation."),
        ("Translate", "She comes from Bangor."),
      ],
    ),
    row(
      "prep.csv",
      &[
        ("Trigger", "am"),
        ("Base", "dau"),
        ("Answer", "ddau"),
        ("Before", "Mae'r trên yn gadael am"),
        ("After", "o'r gloch."),
        ("Outcome", "SM"),
        ("Why", "The preposition 'am' causes soft mutation."),
        ("Translate", "The train leaves at two o'clock."),
      ],
    ),
    row(
      "prep.csv",
      &[
        ("Trigger", "gan"),
        ("Base", "cath"),
        ("Answer", "gath"),
        ("Before", "Mae"),
        ("After", "gyda fi."),
        ("Outcome", "SM"),
        ("Why", "The preposition 'gan' causes soft mutation."),
        ("Translate", "I have a cat."),
      ],
    ),
    row(
      "prep.csv",
      &[
        ("Trigger", "a"),
        ("Base", "coffi"),
        ("Answer", "choffi"),
        ("Before", "Te a"),
        ("After", ", os gwelwch yn dda."),
        ("Outcome", "AM"),
        ("Why", "The conjunction 'a' causes aspirate mutation."),
        ("Translate", "Tea and coffee, please."),
        ("RuleCategory", "Conjunction"),
      ],
    ),
    row(
      "prep.csv",
      &[
        ("Trigger", "gyda"),
        ("Base", "te"),
        ("Answer", "the"),
        ("Before", "Llaeth gyda"),
        ("After", "?"),
        ("Outcome", "AM"),
        ("Why", "'gyda' causes aspirate mutation."),
        ("Translate", "Milk with tea?"),
      ],
    ),
    row(
      "prep.csv",
      &[
        ("Trigger", "yn"),
        ("Base", "Bangor"),
        ("Answer", "Mangor"),
        ("Before", "Maen nhw'n byw ym"),
        ("After", "."),
        ("Outcome", "NM"),
        ("Why", "Locative 'yn' causes nasal mutation and becomes 'ym' before m."),
        ("Translate", "They live in Bangor."),
      ],
    ),
    row(
      "numerals.csv",
      &[
        ("Trigger", "dau"),
        ("Base", "ci"),
        ("Answer", "gi"),
        ("Before", "Mae dau"),
        ("After", "yn yr ardd."),
        ("Outcome", "SM"),
        ("RuleCategory", "Numerals"),
        ("Why", "'dau' causes soft mutation."),
        ("Translate", "There are two dogs in the garden."),
      ],
    ),
    row(
      "numerals.csv",
      &[
        ("Trigger", "tri"),
        ("Base", "car"),
        ("Answer", "char"),
        ("Before", "Mae tri"),
        ("After", "y tu allan."),
        ("Outcome", "AM"),
        ("RuleCategory", "Numerals"),
        ("Why", "'tri' causes aspirate mutation."),
        ("Translate", "There are three cars outside."),
      ],
    ),
    row(
      "numerals.csv",
      &[
        ("Trigger", "chwe"),
        ("Base", "ceffyl"),
        ("Answer", "cheffyl"),
        ("Before", "Gwelais i chwe"),
        ("After", "."),
        ("Outcome", "AM"),
        ("RuleCategory", "Numerals"),
        ("Why", "'chwe' causes aspirate mutation."),
        ("Translate", "I saw six horses."),
      ],
    ),
    row(
      "numerals.csv",
      &[
        ("Trigger", "pum"),
        ("Base", "blynedd"),
        ("Answer", "mlynedd"),
        ("Before", "Ers pum"),
        ("After", "."),
        ("Outcome", "NM"),
        ("RuleCategory", "Numerals"),
        ("Why", "'pum' causes nasal mutation of 'blynedd'."),
        ("Translate", "For five years."),
      ],
    ),
    row(
      "numerals.csv",
      &[
        ("Trigger", "un"),
        ("Base", "merch"),
        ("Answer", "ferch"),
        ("Before", "Dim ond un"),
        ("After", "sydd yma."),
        ("Outcome", "SM"),
        ("RuleCategory", "Numerals"),
        ("Why", "'un' softens feminine singular nouns."),
        ("Translate", "There is only one girl here."),
      ],
    ),
    row(
      "numerals.csv",
      &[
        ("Trigger", "saith"),
        ("Base", "ci"),
        ("Answer", "ci"),
        ("Before", "Mae saith"),
        ("After", "yn y cae."),
        ("Outcome", "NONE"),
        ("RuleCategory", "Numerals"),
        ("Why", "'saith' causes no mutation of 'ci'."),
        ("Translate", "There are seven dogs in the field."),
      ],
    ),
    row(
      "articles.csv",
      &[
        ("Trigger", "y"),
        ("Base", "merch"),
        ("Answer", "ferch"),
        ("Before", "Mae'r"),
        ("After", "yn darllen."),
        ("Outcome", "SM"),
        ("RuleCategory", "Article"),
        ("Why", "The article softens feminine singular nouns."),
        ("Translate", "The girl is reading."),
      ],
    ),
    row(
      "articles.csv",
      &[
        ("Trigger", "y"),
        ("Base", "llyfr"),
        ("Answer", "llyfr"),
        ("Before", "Mae'r"),
        ("After", "ar y bwrdd."),
        ("Outcome", "NONE"),
        ("RuleCategory", "Article"),
        ("Why", "Masculine nouns do not mutate after the article."),
        ("Translate", "The book is on the table."),
      ],
    ),
    row(
      "articles.csv",
      &[
        ("Trigger", "y"),
        ("Base", "basged"),
        ("Answer", "fasged"),
        ("Before", "Rho fe yn y"),
        ("After", "."),
        ("Outcome", "SM"),
        ("RuleCategory", "Article"),
        ("Why", "The article softens feminine singular nouns."),
        ("Translate", "Put it in the basket."),
      ],
    ),
    row(
      "articles.csv",
      &[
        ("Trigger", "yr"),
        ("Base", "afal"),
        ("Answer", "afal"),
        ("Before", "Mae'r plentyn yn bwyta'r"),
        ("After", "."),
        ("Outcome", "NONE"),
        ("RuleCategory", "Article"),
        ("Why", "Vowel-initial nouns take 'yr' with no mutation."),
        ("Translate", "The child is eating the apple."),
      ],
    ),
    row(
      "placenames.csv",
      &[
        ("Trigger", "yng"),
        ("Base", "Caerdydd"),
        ("Answer", "Nghaerdydd"),
        ("Before", "Mae hi'n gweithio yng"),
        ("After", "."),
        ("Outcome", "NM"),
        ("RuleCategory", "PlaceName"),
        ("Why", "Locative 'yn' becomes 'yng' and nasalises C to Ngh."),
        ("Translate", "She works in Cardiff."),
      ],
    ),
    row(
      "placenames.csv",
      &[
        ("Trigger", "yn"),
        ("Base", "Dolgellau"),
        ("Answer", "Nolgellau"),
        ("Before", "Cawson ni ginio yn"),
        ("After", "."),
        ("Outcome", "NM"),
        ("RuleCategory", "PlaceName"),
        ("Why", "Locative 'yn' nasalises D to N."),
        ("Translate", "We had lunch in Dolgellau."),
      ],
    ),
    row(
      "placenames.csv",
      &[
        ("Trigger", "yn"),
        ("Base", "Tywyn"),
        ("Answer", "Nhywyn"),
        ("Before", "Mae'r traeth yn"),
        ("After", "yn hyfryd."),
        ("Outcome", "NM"),
        ("RuleCategory", "PlaceName"),
        ("Why", "Locative 'yn' nasalises T to Nh."),
        ("Translate", "The beach in Tywyn is lovely."),
      ],
    ),
  ]
}
