//! Words shared by the testes and ovaries extractors

use crate::engine::Leaf;

/// A label like "reproductive data".
pub fn label() -> Leaf {
    Leaf::keyword("label", r" reproductive .? (?: data | state | condition ) ")
}

pub fn testes() -> Leaf {
    Leaf::fragment("testes", r" (?: testes | testis | testicles? | test ) \b ")
}

pub fn fully() -> Leaf {
    Leaf::fragment("fully", r" fully | (?: in )? complete (?: ly )? ")
}

/// Negations: "non", "not", "no", ...
pub fn non() -> Leaf {
    Leaf::fragment("non", r" \b (?: not | non | no | semi | sub ) ")
}

pub fn descended() -> Leaf {
    Leaf::fragment("descended", r" (?: un )? (?: des?c?end (?: ed )? | desc? ) ")
}

pub fn scrotal() -> Leaf {
    Leaf::fragment("scrotal", r" (?: scrotum | scrotal | scrot | nscr | scr ) \b ")
}

pub fn partially() -> Leaf {
    Leaf::fragment(
        "partially",
        r" partially | \b part \b | \b pt \b | slightly | slight ",
    )
}

pub fn abdominal() -> Leaf {
    Leaf::fragment("abdominal", r" abdominal | abdomin | abdom | abd ")
}

pub fn size() -> Leaf {
    Leaf::fragment(
        "size",
        r"
        (?: very \s+ )?
        (?: enlarged | enlarge | large | small | shrunken | shrunk | swollen
            | extended | unobservable | sm-med
            | moderate | mod \b | medium | med \b | minute | lg \b
            | sm \b | tiny )
        (?: \s* size d? | \+ )?
        ",
    )
}

/// Gonads could belong to either sex, so the key is ambiguous.
pub fn gonads(name: &str) -> Leaf {
    Leaf::fragment(name, r" (?P<ambiguous_key> gonads? ) ")
}

pub fn other() -> Leaf {
    Leaf::keyword(
        "other",
        r" cryptorchism | cryptorchid | monorchism | monorchid | inguinal ",
    )
}

pub fn and() -> Leaf {
    Leaf::fragment("and", r" \b and \b | & ")
}

pub fn in_word() -> Leaf {
    Leaf::fragment("in", "in")
}

pub fn sep() -> Leaf {
    Leaf::fragment("sep", "[;]")
}

/// Any other word; it keeps unrelated tokens apart.
pub fn word() -> Leaf {
    Leaf::fragment("word", "[a-z]+")
}

pub fn ovary() -> Leaf {
    Leaf::fragment("ovary", r" (?: ovary s? | ovaries | ov ) \b ")
}

pub fn uterus() -> Leaf {
    Leaf::fragment("uterus", r" uterus | uterine | \b ut \b ")
}

pub fn fallopian() -> Leaf {
    Leaf::fragment("fallopian", r" (?: fallopian | foll ) (?: \s* tubes? )? ")
}

pub fn mature() -> Leaf {
    Leaf::fragment("mature", r" (?: immature | mature | imm ) \b ")
}

pub fn active() -> Leaf {
    Leaf::keyword("active", "active | inactive")
}

pub fn visible() -> Leaf {
    Leaf::keyword(
        "visible",
        r" (?: very \s+ )? (?: visible | invisible | hidden | prominent? | seen | conspicuous | bare ) ",
    )
}

pub fn destroyed() -> Leaf {
    Leaf::keyword("destroyed", r" destroy (?: ed )? ")
}

pub fn developed() -> Leaf {
    Leaf::fragment(
        "developed",
        r"
        (?: (?: fully | incompletely | partially | part | well ) [.\s-]{0,2} )?
        (?: developed? | undeveloped? | development | devel
            | dev \b (?: [\s:]* none )? | undevel | undev | indist )
        ",
    )
}

pub fn horns() -> Leaf {
    Leaf::keyword("horns", "horns?")
}

pub fn covered() -> Leaf {
    Leaf::keyword("covered", "covered")
}

pub fn fat() -> Leaf {
    Leaf::keyword("fat", "fat")
}

/// Corpus luteum, in full or abbreviated.
pub fn lut() -> Leaf {
    Leaf::fragment("lut", r" c \.? l \. | \b (?: luteum | lute | lut ) \b ")
}

pub fn corpus() -> Leaf {
    Leaf::fragment("corpus", r" \b (?: corpus | corpora | corp | cor | c ) \b ")
}

pub fn alb() -> Leaf {
    Leaf::fragment("alb", r" \b (?: albicans | alb ) \b ")
}

pub fn color() -> Leaf {
    Leaf::keyword(
        "color",
        r" (?: (?: dark | light | pale ) \s* )? (?: red | pink | brown | black | white | pigmented ) ",
    )
}

pub fn texture() -> Leaf {
    Leaf::keyword("texture", "smooth")
}

pub fn count() -> Leaf {
    Leaf::keyword("count", r" (?: only | all | both )? \s* [12] ")
}

pub fn cyst() -> Leaf {
    Leaf::fragment(
        "cyst",
        r" (?: \d+ \s+ )? (?: cysts? | bodies | cancerous | cancer ) (?: \s+ (?: on | in ) )? ",
    )
}

pub fn embryo() -> Leaf {
    Leaf::fragment(
        "embryo",
        r" embryonic | embryos? | embryps? | embroys | embs? | embrs? | fetuses | fetus | foeti ",
    )
}

pub fn sign() -> Leaf {
    Leaf::fragment("sign", r" [+-] ")
}
