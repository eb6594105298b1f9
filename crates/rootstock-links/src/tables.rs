//! Declarative alias tables.
//!
//! The tables are immutable configuration data loaded once at
//! orchestration start: either the builtin set below or an external
//! JSON document of the same shape. The builder is purely a function of
//! (tables, payload directory state); nothing here touches the disk.

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::error::Result;

/// The three link tables driving the topology builder's phases.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinkTables {
    /// (payload file, command alias) pairs for `bin/`. Several aliases
    /// may name the same payload file (multi-call binaries).
    #[serde(default)]
    pub executables: Vec<(String, String)>,
    /// Library names linked as-is into `lib/`. These become the
    /// canonical on-disk libraries everything else resolves against.
    #[serde(default)]
    pub base_libraries: Vec<String>,
    /// (base library, versioned alias) pairs created inside `lib/`,
    /// always against the phase-2 alias and never the payload file.
    #[serde(default)]
    pub version_aliases: Vec<(String, String)>,
}

impl LinkTables {
    /// Parse an external table document (same shape as the builtin
    /// tables, JSON encoded).
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// The stock tables for the bundled payload.
    pub fn builtin() -> &'static LinkTables {
        &BUILTIN
    }
}

static BUILTIN: Lazy<LinkTables> = Lazy::new(|| LinkTables {
    executables: EXECUTABLES
        .iter()
        .map(|&(source, alias)| (source.to_string(), alias.to_string()))
        .collect(),
    base_libraries: BASE_LIBRARIES.iter().map(|&name| name.to_string()).collect(),
    version_aliases: VERSION_ALIASES
        .iter()
        .map(|&(base, alias)| (base.to_string(), alias.to_string()))
        .collect(),
});

/// Command aliases in `bin/`. Sources resolve against the read-only
/// payload directory; absent payload files are skipped, since not every
/// payload file ships on every device ABI.
const EXECUTABLES: &[(&str, &str)] = &[
    ("codex.so", "codex"),
    ("codex-exec.so", "codex-exec"),
    ("apt.so", "apt"),
    ("apt-mark.so", "apt-mark"),
    ("apt-cache.so", "apt-cache"),
    ("apt-config.so", "apt-config"),
    ("apt-get.so", "apt-get"),
    ("dpkg.so", "dpkg"),
    ("dpkg-buildapi.so", "dpkg-buildapi"),
    ("dpkg-buildtree.so", "dpkg-buildtree"),
    ("dpkg-deb.so", "dpkg-deb"),
    ("dpkg-divert.so", "dpkg-divert"),
    ("dpkg-fsys-usrunmess.so", "dpkg-fsys-usrunmess"),
    ("dpkg-query.so", "dpkg-query"),
    ("dpkg-realpath.so", "dpkg-realpath"),
    ("dpkg-split.so", "dpkg-split"),
    ("dpkg-trigger.so", "dpkg-trigger"),
    ("start-stop-daemon.so", "start-stop-daemon"),
    ("update-alternatives.so", "update-alternatives"),
    ("node.so", "node"),
    ("npm.so", "npm"),
    ("npx.so", "npx"),
    ("corepack.so", "corepack"),
    ("git.so", "git"),
    ("git-daemon.so", "git-daemon"),
    ("git-http-backend.so", "git-http-backend"),
    ("git-http-fetch.so", "git-http-fetch"),
    ("git-http-push.so", "git-http-push"),
    ("git-imap-send.so", "git-imap-send"),
    ("git-remote-http.so", "git-remote-http"),
    ("git-sh-i18n--envsubst.so", "git-sh-i18n--envsubst"),
    ("git-receive-pack.so", "git-receive-pack"),
    ("gh.so", "gh"),
    ("curl.so", "curl"),
    ("which.so", "which"),
    ("ssh.so", "ssh"),
    ("sshd.so", "sshd"),
    ("scp.so", "scp"),
    ("sftp.so", "sftp"),
    ("ssh-add.so", "ssh-add"),
    ("ssh-agent.so", "ssh-agent"),
    ("ssh-keygen.so", "ssh-keygen"),
    ("ssh-keyscan.so", "ssh-keyscan"),
    ("env.so", "env"),
    ("env.so", "printenv"),
    ("bash.so", "bash"),
    ("vim.so", "vim"),
    ("vim.so", "rview"),
    // coreutils multi-call binary
    ("coreutils.so", "["),
    ("coreutils.so", "b2sum"),
    ("coreutils.so", "base32"),
    ("coreutils.so", "base64"),
    ("coreutils.so", "basename"),
    ("coreutils.so", "basenc"),
    ("coreutils.so", "cat"),
    ("coreutils.so", "chcon"),
    ("coreutils.so", "chgrp"),
    ("coreutils.so", "chmod"),
    ("coreutils.so", "chown"),
    ("coreutils.so", "chroot"),
    ("coreutils.so", "cksum"),
    ("coreutils.so", "comm"),
    ("coreutils.so", "cp"),
    ("coreutils.so", "csplit"),
    ("coreutils.so", "cut"),
    ("coreutils.so", "date"),
    ("coreutils.so", "dd"),
    ("coreutils.so", "dir"),
    ("coreutils.so", "dircolors"),
    ("coreutils.so", "dirname"),
    ("coreutils.so", "du"),
    ("coreutils.so", "echo"),
    ("coreutils.so", "expand"),
    ("coreutils.so", "expr"),
    ("coreutils.so", "factor"),
    ("coreutils.so", "false"),
    ("coreutils.so", "fmt"),
    ("coreutils.so", "fold"),
    ("coreutils.so", "groups"),
    ("coreutils.so", "head"),
    ("coreutils.so", "id"),
    ("coreutils.so", "install"),
    ("coreutils.so", "join"),
    ("coreutils.so", "kill"),
    ("coreutils.so", "link"),
    ("coreutils.so", "ln"),
    ("coreutils.so", "logname"),
    ("coreutils.so", "ls"),
    ("coreutils.so", "md5sum"),
    ("coreutils.so", "mkdir"),
    ("coreutils.so", "mkfifo"),
    ("coreutils.so", "mknod"),
    ("coreutils.so", "mktemp"),
    ("coreutils.so", "mv"),
    ("coreutils.so", "nice"),
    ("coreutils.so", "nl"),
    ("coreutils.so", "nohup"),
    ("coreutils.so", "nproc"),
    ("coreutils.so", "numfmt"),
    ("coreutils.so", "od"),
    ("coreutils.so", "paste"),
    ("coreutils.so", "pathchk"),
    ("coreutils.so", "pr"),
    ("coreutils.so", "printf"),
    ("coreutils.so", "ptx"),
    ("coreutils.so", "pwd"),
    ("coreutils.so", "readlink"),
    ("coreutils.so", "realpath"),
    ("coreutils.so", "rm"),
    ("coreutils.so", "rmdir"),
    ("coreutils.so", "runcon"),
    ("coreutils.so", "seq"),
    ("coreutils.so", "sha1sum"),
    ("coreutils.so", "sha224sum"),
    ("coreutils.so", "sha256sum"),
    ("coreutils.so", "sha384sum"),
    ("coreutils.so", "sha512sum"),
    ("coreutils.so", "shred"),
    ("coreutils.so", "shuf"),
    ("coreutils.so", "sleep"),
    ("coreutils.so", "sort"),
    ("coreutils.so", "split"),
    ("coreutils.so", "stat"),
    ("coreutils.so", "stdbuf"),
    ("coreutils.so", "stty"),
    ("coreutils.so", "sum"),
    ("coreutils.so", "sync"),
    ("coreutils.so", "tac"),
    ("coreutils.so", "tail"),
    ("coreutils.so", "tee"),
    ("coreutils.so", "test"),
    ("coreutils.so", "timeout"),
    ("coreutils.so", "touch"),
    ("coreutils.so", "tr"),
    ("coreutils.so", "true"),
    ("coreutils.so", "truncate"),
    ("coreutils.so", "tsort"),
    ("coreutils.so", "tty"),
    ("coreutils.so", "uname"),
    ("coreutils.so", "unexpand"),
    ("coreutils.so", "uniq"),
    ("coreutils.so", "unlink"),
    ("coreutils.so", "vdir"),
    ("coreutils.so", "wc"),
    ("coreutils.so", "whoami"),
    ("coreutils.so", "yes"),
    // kerberos tools
    ("kinit.so", "kinit"),
    ("klist.so", "klist"),
    ("kdestroy.so", "kdestroy"),
    ("kpasswd.so", "kpasswd"),
    ("kswitch.so", "kswitch"),
    ("kvno.so", "kvno"),
    ("ktutil.so", "ktutil"),
    ("kadmin.so", "kadmin"),
    ("kadmin.local.so", "kadmin.local"),
    ("kadmind.so", "kadmind"),
    ("kdb5_util.so", "kdb5_util"),
    ("kprop.so", "kprop"),
    ("kpropd.so", "kpropd"),
    ("kproplog.so", "kproplog"),
    ("krb5kdc.so", "krb5kdc"),
    ("ksu.so", "ksu"),
    ("gss-client.so", "gss-client"),
    ("gss-server.so", "gss-server"),
    ("sclient.so", "sclient"),
    ("sserver.so", "sserver"),
    ("sim_client.so", "sim_client"),
    ("sim_server.so", "sim_server"),
    ("uuclient.so", "uuclient"),
    ("uuserver.so", "uuserver"),
    // dns tools
    ("drill.so", "drill"),
    ("dig.so", "dig"),
    ("nslookup.so", "nslookup"),
    ("host.so", "host"),
    ("delv.so", "delv"),
    ("nsupdate.so", "nsupdate"),
    ("arpaname.so", "arpaname"),
    ("mdig.so", "mdig"),
    ("named.so", "named"),
    ("rndc.so", "rndc"),
    ("rndc-confgen.so", "rndc-confgen"),
    ("ddns-confgen.so", "ddns-confgen"),
    ("tsig-keygen.so", "tsig-keygen"),
    ("named-checkconf.so", "named-checkconf"),
    ("named-checkzone.so", "named-checkzone"),
    ("named-compilezone.so", "named-compilezone"),
    ("named-journalprint.so", "named-journalprint"),
    ("named-rrchecker.so", "named-rrchecker"),
    ("dnssec-keygen.so", "dnssec-keygen"),
    ("dnssec-signzone.so", "dnssec-signzone"),
    ("dnssec-verify.so", "dnssec-verify"),
    ("dnssec-dsfromkey.so", "dnssec-dsfromkey"),
    ("dnssec-keyfromlabel.so", "dnssec-keyfromlabel"),
    ("dnssec-revoke.so", "dnssec-revoke"),
    ("dnssec-settime.so", "dnssec-settime"),
    ("dnssec-importkey.so", "dnssec-importkey"),
    ("dnssec-cds.so", "dnssec-cds"),
    ("dnssec-ksr.so", "dnssec-ksr"),
    ("nsec3hash.so", "nsec3hash"),
    // pagers and terminal helpers
    ("less.so", "less"),
    ("lessecho.so", "lessecho"),
    ("lesskey.so", "lesskey"),
    ("ttyd.so", "ttyd"),
    ("tset.so", "tset"),
    // media tools (payload files keep a lib prefix on some ABIs)
    ("libcllayerinfo.so", "cllayerinfo"),
    ("libwebpmux.so", "webpmux"),
    ("libwebpinfo.so", "webpinfo"),
    ("libimg2webp.so", "img2webp"),
    ("libgif2webp.so", "gif2webp"),
    ("libdwebp.so", "dwebp"),
    ("libcwebp.so", "cwebp"),
    ("libdav1d.so", "dav1d"),
    ("libSvtAv1EncApp.so", "SvtAv1EncApp"),
    ("librubberband.so", "rubberband"),
    ("librubberband-r3.so", "rubberband-r3"),
    ("libcurve_keygen.so", "curve_keygen"),
    ("ffmpeg.so", "ffmpeg"),
    ("ffprobe.so", "ffprobe"),
    // compression utilities
    ("libbrotli.so", "brotli"),
    ("bzip2recover.so", "bzip2recover"),
    ("lzmainfo.so", "lzmainfo"),
    ("zstd.so", "zstd"),
    // crypto utilities
    ("dumpsexp.so", "dumpsexp"),
    ("mpicalc.so", "mpicalc"),
    ("hmac256.so", "hmac256"),
    ("libgpg-error.so", "gpg-error"),
    ("yat2m.so", "yat2m"),
    // assistant CLIs
    ("gemini.so", "gemini"),
    ("claude.so", "claude"),
    // font and glib tools
    ("freetype-config.so", "freetype-config"),
    ("gtester.so", "gtester"),
    ("gsettings.so", "gsettings"),
    ("glib-compile-schemas.so", "glib-compile-schemas"),
    ("glib-compile-resources.so", "glib-compile-resources"),
    ("gobject-query.so", "gobject-query"),
    ("gi-decompile-typelib.so", "gi-decompile-typelib"),
    ("gi-compile-repository.so", "gi-compile-repository"),
    ("gi-inspect-typelib.so", "gi-inspect-typelib"),
    ("gio-querymodules.so", "gio-querymodules"),
    ("gapplication.so", "gapplication"),
    ("gresource.so", "gresource"),
    ("gdbus.so", "gdbus"),
    ("gio.so", "gio"),
];

/// Canonical libraries in `lib/`, linked under their own name against
/// the payload directory.
const BASE_LIBRARIES: &[&str] = &[
    "libandroid-glob.so",
    "libapt-private.so",
    "libapt-pkg.so",
    "libc++_shared.so",
    "libz.so",
    "libcares.so",
    "libbz2.so",
    "libsqlite3.so",
    "libcrypto.so",
    "libssl.so",
    "libssh2.so",
    "liblzma.so",
    "libicudata.so",
    "libicui18n.so",
    "libicuio.so",
    "libicutest.so",
    "libicutu.so",
    "libicuuc.so",
    "libzstd.so",
    "libiconv.so",
    "libcharset.so",
    "libcurl.so",
    "libnghttp2.so",
    "libnghttp3.so",
    "libxxhash0.so",
    "libgcrypt.so",
    "libgpg-error.so",
    "libmd.so",
    "libandroid-support.so",
    "libreadline8.so",
    "libreadline83.so",
    "libhistory8.so",
    "libhistory83.so",
    "libncurses6.so",
    "coreutils.so",
    "libandroid-selinux.so",
    "libgmp.so",
    "libgmpxx.so",
    "libpcre2-8.so",
    "libpcre2-16.so",
    "libpcre2-32.so",
    "libpcre2-posix.so",
    "libldns.so",
    "libverto.so",
    "libgssrpc.so",
    "libgssapi_krb5.so",
    "libkdb5.so",
    "libkrb5.so",
    "libkadm5clnt_mit.so",
    "libkrb5support.so",
    "libkadm5srv_mit.so",
    "libk5crypto.so",
    "libkrad.so",
    "libkrad0.so",
    "libcom_err.so",
    "libjson-c.so",
    "libxml2-16.so",
    "libandroid-execinfo.so",
    "libisccc-9.20.12.so",
    "libisc-9.20.12.so",
    "libns-9.20.12.so",
    "libdns-9.20.12.so",
    "libisccfg-9.20.12.so",
    "libisccfg.so",
    "libfilter-aaaa.so",
    "libfilter-a.so",
    "libdb2.so",
    "libk5tls.so",
    "libotp.so",
    "libpkinit.so",
    "libspake.so",
    "libtest.so",
    "libuv.so",
    "libwebsockets.so",
    "libwebsockets-evlib_uv.so",
    "libgit-receive-pack.so",
    "libavutil.so",
    "libavfilter.so",
    "libpostproc.so",
    "libswscale.so",
    "libswresample.so",
    "libavdevice.so",
    "libavcodec.so",
    "libavformat.so",
    "libavutil59.so",
    "libavcodec61.so",
    "libavformat61.so",
    "libavfilter10.so",
    "libavdevice61.so",
    "libpostproc58.so",
    "libswresample5.so",
    "libswscale8.so",
    "libass.so",
    "libfreetype.so",
    "libglib-2.0.so",
    "libgio-2.0.so",
    "libgmodule-2.0.so",
    "libgobject-2.0.so",
    "libgthread-2.0.so",
    "libgirepository-2.0.so",
    "libgraphite2.so",
    "libgnutls.so",
    "libgnutlsxx.so",
    "libvpx.so",
    "libmp3lame.so",
    "libopus.so",
    "libvorbis.so",
    "libvorbisenc.so",
    "libvorbisfile.so",
    "libx264.so",
    "libx265.so",
    "libxvidcore.so",
    "libsoxr.so",
    "libsoxr-lsr.so",
    "libfribidi.so",
    "libfontconfig.so",
    "libharfbuzz.so",
    "libharfbuzz-cairo.so",
    "libharfbuzz-gobject.so",
    "libharfbuzz-subset.so",
    "libpng16.so",
    "libidn2.so",
    "libunistring.so",
    "libnettle.so",
    "libhogweed.so",
    "libogg.so",
    "libandroid-posix-semaphore.so",
    "libexpat.so",
    "libzmq.so",
    "librubberband.so",
    "librubberband-jni.so",
    "libzimg.so",
    "libOpenCL.so",
    "libgme.so",
    "libopenmpt.so",
    "libbluray.so",
    "libsrt.so",
    "libssh.so",
    "libwebp.so",
    "libwebpmux.so",
    "libwebpdecoder.so",
    "libwebpdemux.so",
    "libsharpyuv.so",
    "libdav1d.so",
    "libopencore-amrwb.so",
    "libopencore-amrnb.so",
    "libaom.so",
    "librav1e.so",
    "libSvtAv1Enc.so",
    "libtheoraenc.so",
    "libtheora.so",
    "libtheoradec.so",
    "libvo-amrwbenc.so",
    "libsodium.so",
    "libmpg123.so",
    "libsyn123.so",
    "libout123.so",
    "libudfread.so",
    "libFLAC.so",
    "libFLAC++.so",
    "librootstock-exec-ld-preload.so",
    "librootstock-exec_nos_c_tre.so",
    "librootstock-exec-linker-ld-preload.so",
    "librootstock-exec-direct-ld-preload.so",
];

/// Versioned aliases inside `lib/`, always resolved against the phase-2
/// base alias so the dynamic linker never crosses into the payload
/// directory through two different spellings.
const VERSION_ALIASES: &[(&str, &str)] = &[
    ("libz.so", "libz.so.1"),
    ("libz.so", "libz.so.1.3.1"),
    ("libz.so", "libz131.so"),
    ("libz.so", "libzlib.so"),
    ("libbz2.so", "libbz2.so.1.0"),
    ("libsqlite3.so", "libsqlite3.so.0"),
    ("libcrypto.so", "libcrypto.so.3"),
    ("libssl.so", "libssl.so.3"),
    ("liblzma.so", "liblzma.so.5"),
    ("liblzma.so", "liblzma.so.5.8.1"),
    ("libicudata.so", "libicudata.so.77"),
    ("libicudata.so", "libicudata.so.77.1"),
    ("libicui18n.so", "libicui18n.so.77"),
    ("libicui18n.so", "libicui18n.so.77.1"),
    ("libicuio.so", "libicuio.so.77"),
    ("libicuio.so", "libicuio.so.77.1"),
    ("libicutest.so", "libicutest.so.77"),
    ("libicutest.so", "libicutest.so.77.1"),
    ("libicutu.so", "libicutu.so.77"),
    ("libicutu.so", "libicutu.so.77.1"),
    ("libicuuc.so", "libicuuc.so.77"),
    ("libicuuc.so", "libicuuc.so.77.1"),
    ("libzstd.so", "libzstd.so.1"),
    ("libxxhash0.so", "libxxhash.so.0"),
    ("libreadline8.so", "libreadline.so.8"),
    ("libreadline8.so", "libreadline.so.8.3"),
    ("libreadline83.so", "libreadline.so"),
    ("libhistory8.so", "libhistory.so.8"),
    ("libhistory8.so", "libhistory.so.8.3"),
    ("libhistory83.so", "libhistory.so"),
    ("libxml2-16.so", "libxml2.so"),
    ("libxml2-16.so", "libxml2.so.16"),
    ("libxml2-16.so", "libxml2.so.16.0.5"),
    ("libandroid-execinfo.so", "libexecinfo.so"),
    ("libncurses6.so", "libncurses.so"),
    ("libncurses6.so", "libncurses.so.6"),
    ("libncurses6.so", "libncursesw.so"),
    ("libncurses6.so", "libncursesw.so.6"),
    ("libncurses6.so", "libncursesw6.so"),
    ("libgmp.so", "libgmp.so.10"),
    ("libgmpxx.so", "libgmpxx.so.4"),
    ("libgssapi_krb5.so", "libgssapi_krb5.so.2"),
    ("libkrb5.so", "libkrb5.so.3"),
    ("libkdb5.so", "libkdb5.so.10"),
    ("libkrb5support.so", "libkrb5support.so.0"),
    ("libkadm5clnt_mit.so", "libkadm5clnt_mit.so.12"),
    ("libkadm5srv_mit.so", "libkadm5srv_mit.so.12"),
    ("libgssrpc.so", "libgssrpc.so.4"),
    ("libk5crypto.so", "libk5crypto.so.3"),
    ("libkrad.so", "libkrad.so.0"),
    ("libcom_err.so", "libcom_err.so.3"),
    ("libverto.so", "libverto.so.0"),
    ("libexpat.so", "libexpat.so.1"),
    ("libexpat.so", "libexpat.so.1.10.2"),
    ("libkrad0.so", "libkrad.so.0"),
    ("libkrad0.so", "libkrad.so"),
    ("libfilter-aaaa.so", "filter-aaaa.so"),
    ("libfilter-a.so", "filter-a.so"),
    ("libdb2.so", "db2.so"),
    ("libk5tls.so", "k5tls.so"),
    ("libotp.so", "otp.so"),
    ("libpkinit.so", "pkinit.so"),
    ("libspake.so", "spake.so"),
    ("libtest.so", "test.so"),
    ("libvpx.so", "libvpx.so.6"),
    ("libvpx.so", "libvpx.so.6.1.0"),
    ("libvpx.so", "libvpx.so.11"),
    ("librav1e.so", "librav1e.so.0"),
    ("librav1e.so", "librav1e.so.0.7.1"),
    ("libvo-amrwbenc.so", "libvo-amrwbenc.so.0"),
    ("libvo-amrwbenc.so", "libvo-amrwbenc.so.0.0.4"),
    ("libx264.so", "libx264.so.155"),
    ("libx264.so", "libx264.so.164"),
    ("libxvidcore.so", "libxvidcore.so.4"),
    ("libxvidcore.so", "libxvidcore.so.4.3"),
    ("libsoxr.so", "libsoxr.so.0"),
    ("libpng16.so", "libpng.so"),
    ("libnettle.so", "libnettle.so.7"),
    ("libnettle.so", "libnettle.so.8"),
    ("libnettle.so", "libnettle.so.8.11"),
    ("libhogweed.so", "libhogweed.so.5"),
    ("libhogweed.so", "libhogweed.so.6"),
    ("libhogweed.so", "libhogweed.so.6.11"),
    ("libogg.so", "libogg.so.0"),
    ("libglib-2.0.so", "libglib-2.0.so.0"),
    ("libgio-2.0.so", "libgio-2.0.so.0"),
    ("libgmodule-2.0.so", "libgmodule-2.0.so.0"),
    ("libgobject-2.0.so", "libgobject-2.0.so.0"),
    ("libgthread-2.0.so", "libgthread-2.0.so.0"),
    ("libgirepository-2.0.so", "libgirepository-2.0.so.0"),
    ("libavutil59.so", "libavutil.so.59"),
    ("libavcodec61.so", "libavcodec.so.61"),
    ("libavformat61.so", "libavformat.so.61"),
    ("libavfilter10.so", "libavfilter.so.10"),
    ("libavdevice61.so", "libavdevice.so.61"),
    ("libpostproc58.so", "libpostproc.so.58"),
    ("libswresample5.so", "libswresample.so.5"),
    ("libswscale8.so", "libswscale.so.8"),
];
